mod catalog;
mod error;
mod parsing;
mod source;
mod store;
mod types;

pub use catalog::Catalog;
pub use error::ElementsError;
pub use source::source_from_location;
pub use store::{CacheState, ElementStore};
pub use types::OrbitalElementRecord;

/// Celestrak feed of crewed and uncrewed space stations.
pub const DEFAULT_SOURCE_URL: &str = "https://celestrak.org/NORAD/elements/stations.txt";

#[cfg(test)]
pub(crate) use parsing::fixtures;
#[cfg(test)]
pub(crate) use store::testing::StaticSource;
