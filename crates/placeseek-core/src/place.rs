//! Place results - hydrated records returned by a query

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::flags::ExistentialFlag;

/// One matched place, hydrated from the result table
///
/// A `PlaceResult` is a snapshot taken at hydration time and holds no
/// reference back into the database it came from.
///
/// The supersession lists are not stored in the result table yet, so
/// `supersedes` and `superseded_by` are always empty even when the
/// `is_superseded` / `is_superseding` flags are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    #[serde(rename = "wof:id")]
    pub id: String,

    #[serde(rename = "wof:parent_id")]
    pub parent_id: String,

    #[serde(rename = "wof:name")]
    pub name: String,

    #[serde(rename = "wof:country")]
    pub country: String,

    #[serde(rename = "wof:placetype")]
    pub placetype: String,

    #[serde(rename = "mz:latitude")]
    pub latitude: f64,

    #[serde(rename = "mz:longitude")]
    pub longitude: f64,

    #[serde(rename = "mz:min_latitude")]
    pub min_latitude: f64,

    #[serde(rename = "mz:min_longitude")]
    pub min_longitude: f64,

    #[serde(rename = "mz:max_latitude")]
    pub max_latitude: f64,

    #[serde(rename = "mz:max_longitude")]
    pub max_longitude: f64,

    #[serde(rename = "mz:is_current")]
    pub is_current: ExistentialFlag,

    #[serde(rename = "mz:is_deprecated")]
    pub is_deprecated: ExistentialFlag,

    #[serde(rename = "mz:is_ceased")]
    pub is_ceased: ExistentialFlag,

    #[serde(rename = "mz:is_superseded")]
    pub is_superseded: ExistentialFlag,

    #[serde(rename = "mz:is_superseding")]
    pub is_superseding: ExistentialFlag,

    #[serde(rename = "wof:supersedes", default)]
    pub supersedes: Vec<i64>,

    #[serde(rename = "wof:superseded_by", default)]
    pub superseded_by: Vec<i64>,

    /// Relative path derived from `id`
    #[serde(rename = "wof:path")]
    pub path: String,

    #[serde(rename = "wof:repo")]
    pub repo: String,

    /// Unix timestamp, seconds
    #[serde(rename = "wof:lastmodified")]
    pub last_modified: i64,
}

impl PlaceResult {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placetype(&self) -> &str {
        &self.placetype
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Absolute URI of the source record. Not tracked by the result table.
    pub fn uri(&self) -> &str {
        ""
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn min_latitude(&self) -> f64 {
        self.min_latitude
    }

    pub fn min_longitude(&self) -> f64 {
        self.min_longitude
    }

    pub fn max_latitude(&self) -> f64 {
        self.max_latitude
    }

    pub fn max_longitude(&self) -> f64 {
        self.max_longitude
    }

    /// Whether the bounding box collapses to the centroid
    pub fn is_point(&self) -> bool {
        self.min_latitude == self.max_latitude && self.min_longitude == self.max_longitude
    }

    pub fn is_current(&self) -> ExistentialFlag {
        self.is_current
    }

    pub fn is_deprecated(&self) -> ExistentialFlag {
        self.is_deprecated
    }

    pub fn is_ceased(&self) -> ExistentialFlag {
        self.is_ceased
    }

    pub fn is_superseded(&self) -> ExistentialFlag {
        self.is_superseded
    }

    pub fn is_superseding(&self) -> ExistentialFlag {
        self.is_superseding
    }

    pub fn supersedes(&self) -> &[i64] {
        &self.supersedes
    }

    pub fn superseded_by(&self) -> &[i64] {
        &self.superseded_by
    }

    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    /// Last modification time, if the stored timestamp is representable
    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.last_modified, 0).single()
    }
}

/// Ordered set of places returned by a query
///
/// Order matches the order in which the search table returned the matching
/// ids. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceResults {
    pub places: Vec<PlaceResult>,
}

impl PlaceResults {
    pub fn new(places: Vec<PlaceResult>) -> Self {
        Self { places }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[PlaceResult] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlaceResult> {
        self.places.iter()
    }
}

impl IntoIterator for PlaceResults {
    type Item = PlaceResult;
    type IntoIter = std::vec::IntoIter<PlaceResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.places.into_iter()
    }
}

impl<'a> IntoIterator for &'a PlaceResults {
    type Item = &'a PlaceResult;
    type IntoIter = std::slice::Iter<'a, PlaceResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.places.iter()
    }
}
