//! Listing filters
//!
//! Filters are checked against the raw record before it is normalized.

use super::ResourceKind;

/// Region / type filter for a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Substring of the provider's full zone URL, e.g. `us-central1`
    pub region: Option<String>,
    pub kind: Option<ResourceKind>,
}

impl ResourceFilter {
    /// Empty region strings mean "no region filter"
    pub fn new(region: Option<&str>, kind: Option<ResourceKind>) -> Self {
        Self {
            region: region.filter(|r| !r.is_empty()).map(String::from),
            kind,
        }
    }

    /// Whether records of this kind can pass at all
    pub fn wants(&self, kind: ResourceKind) -> bool {
        self.kind.map_or(true, |k| k == kind)
    }

    /// Whether a record of `kind` living in `raw_zone` passes both filters
    pub fn matches(&self, kind: ResourceKind, raw_zone: &str) -> bool {
        self.wants(kind)
            && self
                .region
                .as_deref()
                .map_or(true, |region| raw_zone.contains(region))
    }
}
