use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("invalid tle: {0}")]
    InvalidTle(#[from] sgp4::TleError),
    #[error("elements error: {0}")]
    Elements(#[from] sgp4::ElementsError),
    #[error("requested instant is {days} days from the element epoch")]
    OutOfRange { days: i64 },
    #[error("propagation error: {0}")]
    Propagation(String),
    #[error("degenerate subpoint for position {0:?}")]
    Degenerate([f64; 3]),
}

impl From<sgp4::Error> for PropagationError {
    fn from(err: sgp4::Error) -> Self {
        PropagationError::Propagation(err.to_string())
    }
}
