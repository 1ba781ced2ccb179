use thiserror::Error;

/// Failures that leave the element cache empty. Every variant means the
/// source is currently unavailable; the next lookup fetches again.
#[derive(Debug, Error)]
pub enum ElementsError {
    #[error("element source request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("element source returned status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("element file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("invalid element feed from {source_location}: {message}")]
    InvalidFeed {
        source_location: String,
        message: String,
    },
}
