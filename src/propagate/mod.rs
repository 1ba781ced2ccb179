mod error;
mod frames;
mod sample;
mod subpoint;

pub use error::PropagationError;
pub use sample::{PositionReport, PositionSample};
pub use subpoint::project;
