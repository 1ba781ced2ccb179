mod api;
mod error;
mod session;
mod settings;
mod trail;

pub use api::{endpoint, HttpPositionClient, PositionClient};
pub use session::{SessionMode, TrackingSession};
pub use settings::{FileStore, KeyValueStore, Settings, SettingsStore};
