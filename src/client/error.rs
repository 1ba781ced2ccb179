use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Satellite not found")]
    NotFound,
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid api base url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no satellite selected")]
    EmptyName,
    #[error("failed to track satellite: {0}")]
    Request(#[from] ClientError),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    Validation(String),
    #[error("settings IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
