use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::elements::{CacheState, Catalog, ElementsError};
use crate::propagate::{project, PositionSample, PropagationError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("satellite not found: {0}")]
    NotFound(String),
    #[error("element source unavailable: {0}")]
    SourceUnavailable(#[from] ElementsError),
    #[error(transparent)]
    Propagation(#[from] PropagationError),
}

/// Wall-clock source for "now"
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct PositionService {
    catalog: Catalog,
    clock: Arc<dyn Clock>,
}

impl PositionService {
    pub fn new(catalog: Catalog, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }

    pub fn source_location(&self) -> &str {
        self.catalog.source_location()
    }

    pub fn cache_state(&self) -> CacheState {
        self.catalog.cache_state()
    }

    /// All object names in feed order. An empty feed is an empty list.
    pub async fn list_satellites(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.catalog.list_names().await?)
    }

    /// Current subpoint of `name`, computed at the instant the call is served
    pub async fn get_position(&self, name: &str) -> Result<PositionSample, ServiceError> {
        let record = self
            .catalog
            .find(name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))?;

        Ok(project(&record, self.clock.now())?)
    }
}
