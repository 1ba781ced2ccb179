/// One named two-line element set, kept exactly as it appeared in the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrbitalElementRecord {
    pub name: String,
    pub line1: String,
    pub line2: String,
}
