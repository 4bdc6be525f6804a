//! Feature - the GeoJSON document handed to the indexer
//!
//! The indexer treats a feature as opaque; the storage tables pull the
//! columns they need out of its `properties` through the accessors here.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};
use crate::flags::ExistentialFlag;

/// Value of an EDTF date that is known to exist but is not known
const EDTF_UNKNOWN: &str = "uuuu";

/// A GeoJSON feature describing one place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Feature {
    id: i64,
    value: Value,
}

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Degenerate box around a single point
    pub fn point(latitude: f64, longitude: f64) -> Self {
        Self {
            min_latitude: latitude,
            min_longitude: longitude,
            max_latitude: latitude,
            max_longitude: longitude,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_latitude + self.max_latitude) / 2.0,
            (self.min_longitude + self.max_longitude) / 2.0,
        )
    }

    /// Parse GeoJSON ordering: `[min_lon, min_lat, max_lon, max_lat]`
    ///
    /// A 3D box `[min_lon, min_lat, min_z, max_lon, max_lat, max_z]` drops
    /// its elevation.
    fn from_geojson(coords: &[f64]) -> Option<Self> {
        match coords {
            [min_lon, min_lat, max_lon, max_lat]
            | [min_lon, min_lat, _, max_lon, max_lat, _] => Some(Self {
                min_latitude: *min_lat,
                min_longitude: *min_lon,
                max_latitude: *max_lat,
                max_longitude: *max_lon,
            }),
            _ => None,
        }
    }
}

/// Names of a place grouped by how they are qualified
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Names {
    pub preferred: Vec<String>,
    pub variant: Vec<String>,
    pub colloquial: Vec<String>,
    pub other: Vec<String>,
}

impl Feature {
    /// Build a feature from a parsed GeoJSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let properties = value
            .get("properties")
            .and_then(Value::as_object)
            .ok_or(CoreError::MissingProperty("properties"))?;

        let id = properties
            .get("wof:id")
            .or_else(|| value.get("id"))
            .and_then(as_i64)
            .ok_or(CoreError::MissingProperty("wof:id"))?;

        Ok(Self { id, value })
    }

    /// Parse a feature from raw GeoJSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Read and parse a GeoJSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn parent_id(&self) -> i64 {
        self.prop("wof:parent_id").and_then(as_i64).unwrap_or(-1)
    }

    pub fn name(&self) -> &str {
        self.prop_str("wof:name")
    }

    pub fn placetype(&self) -> &str {
        self.prop_str("wof:placetype")
    }

    pub fn country(&self) -> &str {
        self.prop_str("wof:country")
    }

    pub fn repo(&self) -> &str {
        self.prop_str("wof:repo")
    }

    /// Alternate geometry label; empty for the primary record
    pub fn alt_label(&self) -> &str {
        self.prop_str("src:alt_label")
    }

    pub fn is_alt(&self) -> bool {
        !self.alt_label().is_empty()
    }

    pub fn last_modified(&self) -> i64 {
        self.prop("wof:lastmodified").and_then(as_i64).unwrap_or(0)
    }

    /// Bounding box from `bbox`, then `geom:bbox`, then the label centroid
    pub fn bounding_box(&self) -> BoundingBox {
        if let Some(bbox) = self.value.get("bbox").and_then(as_f64_array) {
            if let Some(bbox) = BoundingBox::from_geojson(&bbox) {
                return bbox;
            }
        }

        if let Some(bbox) = self.prop("geom:bbox").and_then(Value::as_str) {
            let coords: Option<Vec<f64>> = bbox
                .split(',')
                .map(|c| c.trim().parse::<f64>().ok())
                .collect();
            if let Some(bbox) = coords.as_deref().and_then(BoundingBox::from_geojson) {
                return bbox;
            }
        }

        let (lat, lon) = self.label_centroid().unwrap_or((0.0, 0.0));
        BoundingBox::point(lat, lon)
    }

    /// Centroid as `(latitude, longitude)`
    pub fn centroid(&self) -> (f64, f64) {
        self.label_centroid()
            .unwrap_or_else(|| self.bounding_box().center())
    }

    pub fn is_current(&self) -> ExistentialFlag {
        if let Some(current) = self.prop("mz:is_current").and_then(as_i64) {
            return ExistentialFlag::from_i64(current);
        }

        if self.is_deprecated().is_true() || self.is_ceased().is_true() {
            return ExistentialFlag::False;
        }

        ExistentialFlag::Unknown
    }

    pub fn is_deprecated(&self) -> ExistentialFlag {
        self.edtf_flag("edtf:deprecated")
    }

    pub fn is_ceased(&self) -> ExistentialFlag {
        self.edtf_flag("edtf:cessation")
    }

    pub fn is_superseded(&self) -> ExistentialFlag {
        ExistentialFlag::from(!self.superseded_by().is_empty())
    }

    pub fn is_superseding(&self) -> ExistentialFlag {
        ExistentialFlag::from(!self.supersedes().is_empty())
    }

    pub fn supersedes(&self) -> Vec<i64> {
        self.id_list("wof:supersedes")
    }

    pub fn superseded_by(&self) -> Vec<i64> {
        self.id_list("wof:superseded_by")
    }

    /// Every `name:*` property, bucketed by qualifier suffix
    pub fn names(&self) -> Names {
        let mut names = Names::default();

        let Some(properties) = self.properties() else {
            return names;
        };

        for (key, value) in properties {
            if !key.starts_with("name:") {
                continue;
            }

            let bucket = if key.ends_with("_x_preferred") {
                &mut names.preferred
            } else if key.ends_with("_x_variant") {
                &mut names.variant
            } else if key.ends_with("_x_colloquial") {
                &mut names.colloquial
            } else {
                &mut names.other
            };

            match value {
                Value::Array(items) => {
                    bucket.extend(items.iter().filter_map(Value::as_str).map(str::to_string))
                }
                Value::String(s) => bucket.push(s.clone()),
                _ => {}
            }
        }

        names
    }

    /// All searchable names joined into one text blob, primary name first
    pub fn names_all(&self) -> String {
        let names = self.names();
        let mut all = Vec::new();

        if !self.name().is_empty() {
            all.push(self.name().to_string());
        }

        all.extend(names.preferred);
        all.extend(names.variant);
        all.extend(names.colloquial);
        all.extend(names.other);

        all.join(" ")
    }

    // Private helpers

    fn properties(&self) -> Option<&Map<String, Value>> {
        self.value.get("properties").and_then(Value::as_object)
    }

    fn prop(&self, key: &str) -> Option<&Value> {
        self.properties().and_then(|p| p.get(key))
    }

    fn prop_str(&self, key: &str) -> &str {
        self.prop(key).and_then(Value::as_str).unwrap_or("")
    }

    fn label_centroid(&self) -> Option<(f64, f64)> {
        for (lat_key, lon_key) in [
            ("lbl:latitude", "lbl:longitude"),
            ("geom:latitude", "geom:longitude"),
        ] {
            let lat = self.prop(lat_key).and_then(as_f64);
            let lon = self.prop(lon_key).and_then(as_f64);
            if let (Some(lat), Some(lon)) = (lat, lon) {
                return Some((lat, lon));
            }
        }
        None
    }

    fn edtf_flag(&self, key: &str) -> ExistentialFlag {
        match self.prop(key).and_then(Value::as_str) {
            None | Some("") => ExistentialFlag::False,
            Some(EDTF_UNKNOWN) => ExistentialFlag::Unknown,
            Some(_) => ExistentialFlag::True,
        }
    }

    fn id_list(&self, key: &str) -> Vec<i64> {
        self.prop(key)
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(as_i64).collect())
            .unwrap_or_default()
    }
}

impl TryFrom<Value> for Feature {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<Feature> for Value {
    fn from(feature: Feature) -> Self {
        feature.value
    }
}

/// Integers may arrive as JSON numbers or numeric strings
fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64_array(value: &Value) -> Option<Vec<f64>> {
    value.as_array()?.iter().map(as_f64).collect()
}
