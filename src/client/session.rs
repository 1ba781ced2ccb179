use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use uuid::Uuid;

use super::api::PositionClient;
use super::error::SessionError;
use super::trail::{TrailBuffer, TrailPoint};
use crate::propagate::PositionSample;

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq)]
pub enum SessionMode {
    Idle,
    Requesting {
        session: Uuid,
        satellite: String,
    },
    Active {
        session: Uuid,
        satellite: String,
        since: DateTime<Utc>,
    },
}

impl SessionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionMode::Idle)
    }
}

#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub mode: SessionMode,
    pub live: bool,
    pub last_sample: Option<PositionSample>,
    pub trail: Vec<TrailPoint>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct Shared {
    mode: SessionMode,
    last_sample: Option<PositionSample>,
    trail: TrailBuffer,
    last_error: Option<String>,
    /// Bumped when the tracked session ends or is replaced. A poll result
    /// is applied only if the epoch it was issued under is still current;
    /// swapping the timer for a new interval keeps the epoch.
    epoch: u64,
}

impl Shared {
    fn record(&mut self, sample: PositionSample) {
        self.trail.append(TrailPoint {
            latitude: sample.latitude,
            longitude: sample.longitude,
        });
        self.last_sample = Some(sample);
    }

    fn go_idle(&mut self, error: Option<String>) {
        self.mode = SessionMode::Idle;
        self.last_error = error;
    }
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Client-side tracking of one selected object.
///
/// `start` issues the first request itself and, on success, arms a single
/// recurring poll. Any poll failure drops the session back to idle; it is
/// never restarted automatically.
pub struct TrackingSession<C> {
    client: Arc<C>,
    shared: Arc<StdMutex<Shared>>,
    worker: Option<WorkerHandle>,
    interval: Duration,
}

impl<C: PositionClient> TrackingSession<C> {
    pub fn new(client: Arc<C>, interval: Duration) -> Self {
        Self {
            client,
            shared: Arc::new(StdMutex::new(Shared {
                mode: SessionMode::Idle,
                last_sample: None,
                trail: TrailBuffer::new(),
                last_error: None,
                epoch: 0,
            })),
            worker: None,
            interval,
        }
    }

    pub fn status(&self) -> SessionStatus {
        let locked = lock(&self.shared);
        SessionStatus {
            mode: locked.mode.clone(),
            live: matches!(locked.mode, SessionMode::Active { .. }),
            last_sample: locked.last_sample.clone(),
            trail: locked.trail.to_vec(),
            last_error: locked.last_error.clone(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a poll schedule is currently armed
    #[cfg(test)]
    pub fn is_polling(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.join.is_finished())
    }

    /// Tear down whatever is running and start tracking `name` from scratch
    pub async fn start(&mut self, name: &str) -> Result<PositionSample, SessionError> {
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        self.end_session();
        let session = Uuid::new_v4();
        {
            let mut locked = lock(&self.shared);
            locked.trail.clear();
            locked.last_sample = None;
            locked.last_error = None;
            locked.mode = SessionMode::Requesting {
                session,
                satellite: name.to_string(),
            };
        }
        log::info!("Tracking {} (session {})", name, session);

        let sample = match self.client.get_position(name).await {
            Ok(sample) => sample,
            Err(e) => {
                log::warn!("Failed to start tracking {}: {}", name, e);
                lock(&self.shared).go_idle(Some(e.to_string()));
                return Err(e.into());
            }
        };

        let epoch = {
            let mut locked = lock(&self.shared);
            locked.record(sample.clone());
            locked.mode = SessionMode::Active {
                session,
                satellite: name.to_string(),
                since: Utc::now(),
            };
            locked.epoch
        };

        self.arm_schedule(name.to_string(), epoch);
        Ok(sample)
    }

    /// Cancel polling and go idle. The trail stays visible until the next
    /// `start`.
    pub fn stop(&mut self) {
        self.end_session();
        let mut locked = lock(&self.shared);
        if !locked.mode.is_idle() {
            log::info!("Tracking stopped");
        }
        locked.go_idle(None);
    }

    /// Change the poll interval. An active schedule is replaced by one at
    /// the new interval; no extra poll is issued. A poll already in flight
    /// still lands in the trail.
    pub fn set_interval(&mut self, interval: Duration) {
        if interval == self.interval {
            return;
        }
        self.interval = interval;

        let (satellite, epoch) = {
            let locked = lock(&self.shared);
            match &locked.mode {
                SessionMode::Active { satellite, .. } => (satellite.clone(), locked.epoch),
                _ => return,
            }
        };
        self.cancel_schedule();
        log::info!("Polling {} every {:?}", satellite, interval);
        self.arm_schedule(satellite, epoch);
    }

    /// Stop the timer. The worker finishes an in-flight request, applies it
    /// if the session is still current, then exits.
    fn cancel_schedule(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
        }
    }

    /// Stop the timer and invalidate every result still in flight
    fn end_session(&mut self) {
        self.cancel_schedule();
        lock(&self.shared).epoch += 1;
    }

    fn arm_schedule(&mut self, satellite: String, epoch: u64) {
        debug_assert!(self.worker.is_none());
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_poll_loop(
            self.client.clone(),
            self.shared.clone(),
            satellite,
            epoch,
            self.interval.max(MIN_PERIOD),
            stop_rx,
        ));
        self.worker = Some(WorkerHandle { stop_tx, join });
    }
}

impl<C> Drop for TrackingSession<C> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
        }
        lock(&self.shared).epoch += 1;
    }
}

async fn run_poll_loop<C: PositionClient>(
    client: Arc<C>,
    shared: Arc<StdMutex<Shared>>,
    satellite: String,
    epoch: u64,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop || lock(&shared).epoch != epoch {
            return;
        }

        let result = client.get_position(&satellite).await;

        {
            let mut locked = lock(&shared);
            if locked.epoch != epoch {
                log::debug!("Discarding stale position for {}", satellite);
                return;
            }
            match result {
                Ok(sample) => locked.record(sample),
                Err(e) => {
                    log::warn!("Failed to update position of {}: {}", satellite, e);
                    locked.go_idle(Some(e.to_string()));
                    // a replacement timer sees this and exits on its next tick
                    locked.epoch += 1;
                    return;
                }
            }
        }

        // timer replaced while the request was in flight
        if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
            return;
        }
    }
}

fn lock(shared: &StdMutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
