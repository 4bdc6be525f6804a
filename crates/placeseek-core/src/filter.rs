//! Query filters
//!
//! Filters are passed alongside a query term. The search engine accepts them
//! but does not compose them into the match query; callers that need the
//! constraints applied can run `Filter::matches` over the returned places.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flags::ExistentialFlag;
use crate::place::PlaceResult;

/// Constraint over place attributes
///
/// Every method defaults to accepting, so implementations only override the
/// dimensions they care about.
pub trait Filter: Send + Sync + fmt::Debug {
    fn has_placetype(&self, _placetype: &str) -> bool {
        true
    }

    fn is_current(&self, _flag: ExistentialFlag) -> bool {
        true
    }

    fn is_deprecated(&self, _flag: ExistentialFlag) -> bool {
        true
    }

    fn is_ceased(&self, _flag: ExistentialFlag) -> bool {
        true
    }

    fn is_superseded(&self, _flag: ExistentialFlag) -> bool {
        true
    }

    fn is_superseding(&self, _flag: ExistentialFlag) -> bool {
        true
    }

    /// Check a hydrated place against every dimension
    fn matches(&self, place: &PlaceResult) -> bool {
        self.has_placetype(&place.placetype)
            && self.is_current(place.is_current)
            && self.is_deprecated(place.is_deprecated)
            && self.is_ceased(place.is_ceased)
            && self.is_superseded(place.is_superseded)
            && self.is_superseding(place.is_superseding)
    }
}

/// Filter built from optional per-field constraints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceFilter {
    /// Accepted placetypes (empty = any)
    pub placetypes: Vec<String>,

    pub is_current: Option<ExistentialFlag>,
    pub is_deprecated: Option<ExistentialFlag>,
    pub is_ceased: Option<ExistentialFlag>,
    pub is_superseded: Option<ExistentialFlag>,
    pub is_superseding: Option<ExistentialFlag>,
}

impl PlaceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placetype(mut self, placetype: impl Into<String>) -> Self {
        self.placetypes.push(placetype.into());
        self
    }

    pub fn with_current(mut self, flag: ExistentialFlag) -> Self {
        self.is_current = Some(flag);
        self
    }

    pub fn with_deprecated(mut self, flag: ExistentialFlag) -> Self {
        self.is_deprecated = Some(flag);
        self
    }
}

fn accepts(constraint: Option<ExistentialFlag>, flag: ExistentialFlag) -> bool {
    constraint.map_or(true, |wanted| wanted == flag)
}

impl Filter for PlaceFilter {
    fn has_placetype(&self, placetype: &str) -> bool {
        self.placetypes.is_empty() || self.placetypes.iter().any(|p| p == placetype)
    }

    fn is_current(&self, flag: ExistentialFlag) -> bool {
        accepts(self.is_current, flag)
    }

    fn is_deprecated(&self, flag: ExistentialFlag) -> bool {
        accepts(self.is_deprecated, flag)
    }

    fn is_ceased(&self, flag: ExistentialFlag) -> bool {
        accepts(self.is_ceased, flag)
    }

    fn is_superseded(&self, flag: ExistentialFlag) -> bool {
        accepts(self.is_superseded, flag)
    }

    fn is_superseding(&self, flag: ExistentialFlag) -> bool {
        accepts(self.is_superseding, flag)
    }
}
