use crate::elements::error::ElementsError;
use crate::elements::store::{CacheState, ElementStore};
use crate::elements::types::OrbitalElementRecord;

/// Name index over the element cache. Both lookups populate the cache on
/// first use, so a source failure surfaces through either of them.
pub struct Catalog {
    store: ElementStore,
}

impl Catalog {
    pub fn new(store: ElementStore) -> Self {
        Self { store }
    }

    pub fn source_location(&self) -> &str {
        self.store.source_location()
    }

    pub fn cache_state(&self) -> CacheState {
        self.store.state()
    }

    /// Names in feed order, duplicates included
    pub async fn list_names(&self) -> Result<Vec<String>, ElementsError> {
        let records = self.store.get_all().await?;
        Ok(records.iter().map(|r| r.name.clone()).collect())
    }

    /// Exact, case-sensitive lookup; the first record in feed order wins
    pub async fn find(&self, name: &str) -> Result<Option<OrbitalElementRecord>, ElementsError> {
        let records = self.store.get_all().await?;
        Ok(records.iter().find(|r| r.name == name).cloned())
    }
}
