//! Full-text database capability

use async_trait::async_trait;
use placeseek_core::{Feature, Filter, PlaceResults};

use crate::Result;

/// A full-text searchable database of places
///
/// Instances are obtained from the registry by connection URI, so callers
/// never name a concrete backend.
///
/// # Consistency
///
/// `index_feature` calls on one instance are serialized against each other.
/// `query_string` takes no lock: a query running alongside an index write may
/// observe a place whose search entry exists before its result entry does.
#[async_trait]
pub trait FullTextDatabase: Send + Sync + std::fmt::Debug {
    /// Backend name for diagnostics
    fn name(&self) -> &str;

    /// Index one feature into the search table, then the result table
    async fn index_feature(&self, feature: &Feature) -> Result<()>;

    /// Match `term` and return the hydrated places in match order
    ///
    /// `filters` are accepted for forward compatibility but are not applied.
    async fn query_string(&self, term: &str, filters: &[&dyn Filter]) -> Result<PlaceResults>;

    /// Release the underlying connection
    async fn close(&self) -> Result<()>;
}
