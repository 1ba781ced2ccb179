mod client;
mod elements;
mod propagate;
mod service;
mod web;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{
    FileStore, HttpPositionClient, KeyValueStore, PositionClient, SessionMode, Settings,
    SettingsStore, TrackingSession,
};
use crate::web::Config;

const DEFAULT_SETTINGS_PATH: &str = "sat-track-settings.json";
const SETTINGS_RELOAD: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "sat-track")]
#[command(about = "Live satellite position service and tracking client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the position API server
    Serve {
        /// YAML config file
        #[arg(long)]
        config: Option<String>,
        /// Override `web.bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// List satellites known to the configured API
    Satellites {
        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: PathBuf,
    },
    /// Track one satellite until interrupted
    Track {
        name: String,
        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: PathBuf,
    },
    /// Show or change client settings
    Settings {
        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: PathBuf,
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Query a running server end to end
    Check {
        #[arg(long, default_value = "http://localhost:5000")]
        base_url: String,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        api_base_url: Option<String>,
        /// Poll interval in seconds
        #[arg(long)]
        interval: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, bind } => serve(config, bind).await,
        Commands::Satellites { settings } => satellites(&settings).await,
        Commands::Track { name, settings } => track(&name, &settings).await,
        Commands::Settings { settings, action } => settings_command(&settings, action),
        Commands::Check { base_url } => check(&base_url).await,
    }
}

async fn serve(config_path: Option<String>, bind: Option<String>) -> ExitCode {
    let mut config = match config_path {
        Some(path) => match Config::from_file(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if let Some(bind) = bind {
        config.web.bind = bind;
    }

    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_settings(path: &Path) -> Option<(SettingsStore<FileStore>, Settings)> {
    let store = SettingsStore::new(FileStore::new(path.to_path_buf()));
    match store.get_or_default() {
        Ok(settings) => Some((store, settings)),
        Err(e) => {
            eprintln!("Error reading settings {}: {}", path.display(), e);
            None
        }
    }
}

fn connect(base_url: &str) -> Option<HttpPositionClient> {
    match HttpPositionClient::new(base_url) {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("{}", e);
            None
        }
    }
}

async fn satellites(settings_path: &Path) -> ExitCode {
    let Some((_, settings)) = load_settings(settings_path) else {
        return ExitCode::FAILURE;
    };
    let Some(client) = connect(&settings.api_base_url) else {
        return ExitCode::FAILURE;
    };

    match client.list_satellites().await {
        Ok(names) if names.is_empty() => {
            println!("No satellites available");
            ExitCode::SUCCESS
        }
        Ok(names) => {
            for name in names {
                println!("{}", name);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error loading satellites: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn track(name: &str, settings_path: &Path) -> ExitCode {
    let Some((store, settings)) = load_settings(settings_path) else {
        return ExitCode::FAILURE;
    };
    let Some(client) = connect(&settings.api_base_url) else {
        return ExitCode::FAILURE;
    };
    let client = Arc::new(client);
    let mut session = TrackingSession::new(client.clone(), settings.poll_interval());

    if let Err(e) = session.start(name).await {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    if let SessionMode::Active { session: id, since, .. } = session.status().mode {
        println!("Tracking {} since {} (session {})", name, since, id);
    }

    let mut last_seen = None;
    let mut reload = tokio::time::interval(SETTINGS_RELOAD);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                session.stop();
                println!("Stopped");
                return ExitCode::SUCCESS;
            }
            _ = reload.tick() => {}
        }

        apply_saved_settings(&store, &client, &mut session);

        let status = session.status();
        if let Some(sample) = &status.last_sample {
            if Some(sample.observed_at) != last_seen {
                last_seen = Some(sample.observed_at);
                let trail_start = status
                    .trail
                    .first()
                    .map(|p| format!(" from {:.2} {:.2}", p.latitude, p.longitude))
                    .unwrap_or_default();
                println!(
                    "{} lat {:.4} lon {:.4} alt {:.2} km (trail of {}{})",
                    sample.satellite_name,
                    sample.latitude,
                    sample.longitude,
                    sample.altitude_km,
                    status.trail.len(),
                    trail_start
                );
            }
        }
        if !status.live {
            if let Some(error) = status.last_error {
                eprintln!("Tracking ended: {}", error);
            }
            return ExitCode::FAILURE;
        }
    }
}

/// Pick up settings edited from another shell. Settings that fail
/// validation leave the running session as it is.
fn apply_saved_settings<S: KeyValueStore>(
    store: &SettingsStore<S>,
    client: &HttpPositionClient,
    session: &mut TrackingSession<HttpPositionClient>,
) {
    let latest = match store.get() {
        Ok(latest) => latest,
        Err(e) => {
            log::warn!("Ignoring saved settings: {}", e);
            return;
        }
    };

    if latest.api_base_url != client.base_url() {
        match client.set_base_url(&latest.api_base_url) {
            Ok(()) => log::info!("API base URL is now {}", latest.api_base_url),
            Err(e) => log::warn!("Keeping previous API base URL: {}", e),
        }
    }
    if latest.poll_interval() != session.interval() {
        session.set_interval(latest.poll_interval());
    }
}

fn settings_command(settings_path: &Path, action: SettingsAction) -> ExitCode {
    let Some((store, current)) = load_settings(settings_path) else {
        return ExitCode::FAILURE;
    };

    let settings = match action {
        SettingsAction::Show => current,
        SettingsAction::Set {
            api_base_url,
            interval,
        } => {
            let candidate = Settings {
                api_base_url: api_base_url.unwrap_or(current.api_base_url),
                poll_interval_seconds: interval.unwrap_or(current.poll_interval_seconds),
            };
            match store.set(candidate) {
                Ok(saved) => saved,
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    println!("apiBaseUrl: {}", settings.api_base_url);
    println!("pollIntervalSeconds: {}", settings.poll_interval_seconds);
    ExitCode::SUCCESS
}

async fn check(base_url: &str) -> ExitCode {
    let Some(client) = connect(base_url) else {
        return ExitCode::FAILURE;
    };

    println!("Testing {}/api/satellites", base_url.trim_end_matches('/'));
    let names = match client.list_satellites().await {
        Ok(names) => names,
        Err(e) => {
            eprintln!("Satellites request failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Found {} satellites", names.len());
    for name in names.iter().take(5) {
        println!("  {}", name);
    }

    let Some(first) = names.first() else {
        println!("No satellites to query");
        return ExitCode::SUCCESS;
    };

    println!("Testing position of {}", first);
    match client.get_position(first).await {
        Ok(sample) => {
            println!("  latitude:  {:.4}", sample.latitude);
            println!("  longitude: {:.4}", sample.longitude);
            println!("  altitude:  {:.2} km", sample.altitude_km);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Position request failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(dir: &tempfile::TempDir) -> (SettingsStore<FileStore>, Arc<HttpPositionClient>) {
        let store = SettingsStore::new(FileStore::new(dir.path().join("settings.json")));
        store
            .set(Settings {
                api_base_url: "http://tracker:9000".to_string(),
                poll_interval_seconds: 30,
            })
            .unwrap();
        let client = Arc::new(HttpPositionClient::new("http://tracker:9000").unwrap());
        (store, client)
    }

    #[test]
    fn valid_edits_reach_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let (store, client) = fixture(&dir);
        let mut session = TrackingSession::new(client.clone(), Duration::from_secs(30));

        store
            .set(Settings {
                api_base_url: "http://backup:9000".to_string(),
                poll_interval_seconds: 5,
            })
            .unwrap();
        apply_saved_settings(&store, &client, &mut session);

        assert_eq!(client.base_url(), "http://backup:9000");
        assert_eq!(session.interval(), Duration::from_secs(5));
    }

    #[test]
    fn invalid_edits_keep_the_running_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let (store, client) = fixture(&dir);
        let mut session = TrackingSession::new(client.clone(), Duration::from_secs(30));

        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"apiBaseUrl": "http://tracker:9000", "pollIntervalSeconds": "0"}"#,
        )
        .unwrap();
        apply_saved_settings(&store, &client, &mut session);

        assert_eq!(client.base_url(), "http://tracker:9000");
        assert_eq!(session.interval(), Duration::from_secs(30));
    }
}
