//! Place id to relative path mapping
//!
//! Records live in a directory tree derived from their id: the decimal digits
//! are split into groups of three, each group becoming a directory, and the
//! file itself is named after the full id.
//!
//! ```text
//! 101736545 -> 101/736/545/101736545.geojson
//! 1234      -> 123/4/1234.geojson
//! ```

use crate::error::{CoreError, Result};

const EXTENSION: &str = "geojson";

/// Relative directory for an id, without the file name
pub fn id_to_tree(id: i64) -> Result<String> {
    if id < 0 {
        return Err(CoreError::InvalidId(id));
    }

    let digits = id.to_string();
    let parts: Vec<&str> = digits
        .as_bytes()
        .chunks(3)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();

    Ok(parts.join("/"))
}

/// Relative path of the primary record for an id
pub fn id_to_rel_path(id: i64) -> Result<String> {
    let tree = id_to_tree(id)?;
    Ok(format!("{}/{}.{}", tree, id, EXTENSION))
}

/// Relative path of a record, honouring an alternate label
///
/// An empty label is the primary record.
pub fn id_to_rel_path_alt(id: i64, alt_label: &str) -> Result<String> {
    if alt_label.is_empty() {
        return id_to_rel_path(id);
    }

    let tree = id_to_tree(id)?;
    Ok(format!("{}/{}-alt-{}.{}", tree, id, alt_label, EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_digit_id() {
        assert_eq!(
            id_to_rel_path(101736545).unwrap(),
            "101/736/545/101736545.geojson"
        );
    }

    #[test]
    fn test_uneven_id() {
        assert_eq!(id_to_rel_path(1234).unwrap(), "123/4/1234.geojson");
        assert_eq!(id_to_rel_path(101).unwrap(), "101/101.geojson");
        assert_eq!(id_to_rel_path(0).unwrap(), "0/0.geojson");
    }

    #[test]
    fn test_negative_id_rejected() {
        assert!(matches!(id_to_rel_path(-1), Err(CoreError::InvalidId(-1))));
    }

    #[test]
    fn test_alt_label() {
        assert_eq!(
            id_to_rel_path_alt(101736545, "quattroshapes").unwrap(),
            "101/736/545/101736545-alt-quattroshapes.geojson"
        );
        assert_eq!(id_to_rel_path_alt(101, "").unwrap(), "101/101.geojson");
    }
}
