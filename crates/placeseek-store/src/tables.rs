//! Search and result tables
//!
//! Two tables back the full-text layer:
//!
//! | Table | Kind | Keyed by | Purpose |
//! |-------|------|----------|---------|
//! | `search` | FTS4 virtual table | `id` | Matchable name text |
//! | `spr` | ordinary table | `(id, alt_label)` | Columns needed to hydrate a `PlaceResult` |

use placeseek_core::{id_to_rel_path_alt, ExistentialFlag, Feature, PlaceResult};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::database::SqliteDatabase;
use crate::error::{Result, StoreError};

pub const SEARCH_TABLE_NAME: &str = "search";
pub const SPR_TABLE_NAME: &str = "spr";

/// A named table bound to a database
pub trait Table: Send + Sync {
    fn name(&self) -> &str;

    /// `CREATE ... IF NOT EXISTS` statements for the table and its indexes
    fn schema(&self) -> String;

    fn init(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch(&self.schema())?;
        Ok(())
    }

    /// Upsert the columns derived from `feature`
    fn index_record(&self, conn: &Connection, feature: &Feature) -> Result<()>;
}

/// Full-text table of place names
#[derive(Debug, Clone)]
pub struct SearchTable {
    name: String,
}

impl SearchTable {
    pub fn new() -> Self {
        Self {
            name: SEARCH_TABLE_NAME.to_string(),
        }
    }

    /// Create the table in `db` if needed and return a handle to it
    pub fn with_database(db: &SqliteDatabase) -> Result<Self> {
        let table = Self::new();
        db.create_table(&table)?;
        Ok(table)
    }

    /// Ids whose names match `term`, in the order SQLite returns them
    ///
    /// The term is forwarded verbatim as the FTS match expression.
    pub fn match_ids(&self, conn: &Connection, term: &str) -> Result<Vec<i64>> {
        let sql = format!("SELECT id FROM {} WHERE names_all MATCH ?1", self.name);
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query([term])?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(id_from_column(row, 0)?);
        }

        Ok(ids)
    }
}

impl Default for SearchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Table for SearchTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> String {
        format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING fts4(
                id, placetype,
                name, names_all, names_preferred, names_variant, names_colloquial,
                is_current, is_ceased, is_deprecated, is_superseded
            );",
            self.name
        )
    }

    fn index_record(&self, conn: &Connection, feature: &Feature) -> Result<()> {
        // Only the primary record is searchable; alternates are reachable
        // through the result table.
        if feature.is_alt() {
            debug!(
                "Skipping alt record {} ({}) for {}",
                feature.id(),
                feature.alt_label(),
                self.name
            );
            return Ok(());
        }

        let names = feature.names();

        let tx = conn.unchecked_transaction()?;

        tx.execute(&format!("DELETE FROM {} WHERE id = ?1", self.name), [feature.id()])?;
        tx.execute(
            &format!(
                "INSERT INTO {} (
                    id, placetype,
                    name, names_all, names_preferred, names_variant, names_colloquial,
                    is_current, is_ceased, is_deprecated, is_superseded
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                self.name
            ),
            params![
                feature.id(),
                feature.placetype(),
                feature.name(),
                feature.names_all(),
                names.preferred.join(" "),
                names.variant.join(" "),
                names.colloquial.join(" "),
                feature.is_current().as_i64(),
                feature.is_ceased().as_i64(),
                feature.is_deprecated().as_i64(),
                feature.is_superseded().as_i64(),
            ],
        )?;

        tx.commit()?;

        debug!("Indexed {} in {}", feature.id(), self.name);
        Ok(())
    }
}

/// Standard places result table
#[derive(Debug, Clone)]
pub struct SprTable {
    name: String,
}

impl SprTable {
    pub fn new() -> Self {
        Self {
            name: SPR_TABLE_NAME.to_string(),
        }
    }

    /// Create the table in `db` if needed and return a handle to it
    pub fn with_database(db: &SqliteDatabase) -> Result<Self> {
        let table = Self::new();
        db.create_table(&table)?;
        Ok(table)
    }

    /// Hydrate one place keyed by `(id, alt_label)`
    ///
    /// The supersession lists are not stored yet and come back empty.
    pub fn retrieve(&self, conn: &Connection, id: i64, alt_label: &str) -> Result<PlaceResult> {
        let sql = format!(
            "SELECT
                id, parent_id, name, placetype,
                country, repo,
                latitude, longitude,
                min_latitude, min_longitude,
                max_latitude, max_longitude,
                is_current, is_deprecated, is_ceased,
                is_superseded, is_superseding,
                lastmodified
            FROM {} WHERE id = ?1 AND alt_label = ?2",
            self.name
        );

        let mut stmt = conn.prepare_cached(&sql)?;
        let place = stmt
            .query_row(params![id, alt_label], place_from_row)
            .optional()?;

        let mut place = place.ok_or_else(|| StoreError::NotFound {
            id,
            alt_label: alt_label.to_string(),
        })?;

        place.path = id_to_rel_path_alt(id, alt_label)?;
        Ok(place)
    }
}

impl Default for SprTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Table for SprTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {name} (
                id INTEGER NOT NULL,
                parent_id INTEGER,
                name TEXT,
                placetype TEXT,
                country TEXT,
                repo TEXT,
                latitude REAL,
                longitude REAL,
                min_latitude REAL,
                min_longitude REAL,
                max_latitude REAL,
                max_longitude REAL,
                is_current INTEGER,
                is_deprecated INTEGER,
                is_ceased INTEGER,
                is_superseded INTEGER,
                is_superseding INTEGER,
                lastmodified INTEGER,
                alt_label TEXT NOT NULL DEFAULT ''
            );
            CREATE UNIQUE INDEX IF NOT EXISTS {name}_by_id ON {name} (id, alt_label);
            CREATE INDEX IF NOT EXISTS {name}_by_placetype ON {name} (placetype, country);",
            name = self.name
        )
    }

    fn index_record(&self, conn: &Connection, feature: &Feature) -> Result<()> {
        let (latitude, longitude) = feature.centroid();
        let bbox = feature.bounding_box();

        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (
                    id, parent_id, name, placetype,
                    country, repo,
                    latitude, longitude,
                    min_latitude, min_longitude,
                    max_latitude, max_longitude,
                    is_current, is_deprecated, is_ceased,
                    is_superseded, is_superseding,
                    lastmodified, alt_label
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                self.name
            ),
            params![
                feature.id(),
                feature.parent_id(),
                feature.name(),
                feature.placetype(),
                feature.country(),
                feature.repo(),
                latitude,
                longitude,
                bbox.min_latitude,
                bbox.min_longitude,
                bbox.max_latitude,
                bbox.max_longitude,
                feature.is_current().as_i64(),
                feature.is_deprecated().as_i64(),
                feature.is_ceased().as_i64(),
                feature.is_superseded().as_i64(),
                feature.is_superseding().as_i64(),
                feature.last_modified(),
                feature.alt_label(),
            ],
        )?;

        debug!("Indexed {} in {}", feature.id(), self.name);
        Ok(())
    }
}

fn place_from_row(row: &Row<'_>) -> rusqlite::Result<PlaceResult> {
    let id: i64 = row.get(0)?;
    let parent_id: Option<i64> = row.get(1)?;

    Ok(PlaceResult {
        id: id.to_string(),
        parent_id: parent_id.unwrap_or(-1).to_string(),
        name: text(row, 2)?,
        placetype: text(row, 3)?,
        country: text(row, 4)?,
        repo: text(row, 5)?,
        latitude: real(row, 6)?,
        longitude: real(row, 7)?,
        min_latitude: real(row, 8)?,
        min_longitude: real(row, 9)?,
        max_latitude: real(row, 10)?,
        max_longitude: real(row, 11)?,
        is_current: flag(row, 12)?,
        is_deprecated: flag(row, 13)?,
        is_ceased: flag(row, 14)?,
        is_superseded: flag(row, 15)?,
        is_superseding: flag(row, 16)?,
        supersedes: Vec::new(),
        superseded_by: Vec::new(),
        path: String::new(),
        last_modified: row.get::<_, Option<i64>>(17)?.unwrap_or(0),
    })
}

fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn real(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(0.0))
}

fn flag(row: &Row<'_>, idx: usize) -> rusqlite::Result<ExistentialFlag> {
    let value = row.get::<_, Option<i64>>(idx)?.unwrap_or(-1);
    Ok(ExistentialFlag::from_i64(value))
}

/// FTS columns are untyped; ids may come back as integers or text
fn id_from_column(row: &Row<'_>, idx: usize) -> Result<i64> {
    match row.get_ref(idx)? {
        ValueRef::Integer(id) => Ok(id),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| StoreError::InvalidRow(format!("non-numeric id {:?}", bytes))),
        other => Err(StoreError::InvalidRow(format!(
            "unexpected id column type {:?}",
            other.data_type()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(id: i64, name: &str, alt_label: &str) -> Feature {
        Feature::from_value(json!({
            "type": "Feature",
            "bbox": [-122.511, 37.764, -122.454, 37.774],
            "properties": {
                "wof:id": id,
                "wof:parent_id": 85922583,
                "wof:name": name,
                "wof:placetype": "park",
                "wof:country": "US",
                "wof:repo": "whosonfirst-data-admin-us",
                "wof:lastmodified": 1600000000,
                "lbl:latitude": 37.769,
                "lbl:longitude": -122.483,
                "mz:is_current": 1,
                "edtf:deprecated": "uuuu",
                "src:alt_label": alt_label
            }
        }))
        .unwrap()
    }

    fn setup() -> (SqliteDatabase, SearchTable, SprTable) {
        let db = SqliteDatabase::in_memory().unwrap();
        let search = SearchTable::with_database(&db).unwrap();
        let spr = SprTable::with_database(&db).unwrap();
        (db, search, spr)
    }

    #[test]
    fn test_tables_created() {
        let (db, _, _) = setup();
        assert!(db.has_table(SEARCH_TABLE_NAME).unwrap());
        assert!(db.has_table(SPR_TABLE_NAME).unwrap());

        // Opening again must not fail on existing tables
        SearchTable::with_database(&db).unwrap();
        SprTable::with_database(&db).unwrap();
    }

    #[test]
    fn test_match_ids() {
        let (db, search, _) = setup();

        db.with_connection(|conn| {
            search.index_record(conn, &feature(101, "Golden Gate Park", ""))?;
            search.index_record(conn, &feature(102, "Dolores Park", ""))?;
            Ok(())
        })
        .unwrap();

        let ids = db.with_connection(|conn| search.match_ids(conn, "golden")).unwrap();
        assert_eq!(ids, vec![101]);

        let ids = db.with_connection(|conn| search.match_ids(conn, "park")).unwrap();
        assert_eq!(ids.len(), 2);

        let ids = db.with_connection(|conn| search.match_ids(conn, "zzyzx")).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_search_upsert_replaces() {
        let (db, search, _) = setup();

        db.with_connection(|conn| {
            search.index_record(conn, &feature(101, "Golden Gate Park", ""))?;
            search.index_record(conn, &feature(101, "Presidio", ""))?;
            Ok(())
        })
        .unwrap();

        let golden = db.with_connection(|conn| search.match_ids(conn, "golden")).unwrap();
        assert!(golden.is_empty());

        let presidio = db.with_connection(|conn| search.match_ids(conn, "presidio")).unwrap();
        assert_eq!(presidio, vec![101]);
    }

    #[test]
    fn test_alt_records_not_searchable() {
        let (db, search, _) = setup();

        db.with_connection(|conn| search.index_record(conn, &feature(101, "Golden Gate Park", "osm")))
            .unwrap();

        let ids = db.with_connection(|conn| search.match_ids(conn, "golden")).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_retrieve_place() {
        let (db, _, spr) = setup();

        db.with_connection(|conn| spr.index_record(conn, &feature(101, "Golden Gate Park", "")))
            .unwrap();

        let place = db.with_connection(|conn| spr.retrieve(conn, 101, "")).unwrap();
        assert_eq!(place.id, "101");
        assert_eq!(place.parent_id, "85922583");
        assert_eq!(place.name, "Golden Gate Park");
        assert_eq!(place.placetype, "park");
        assert_eq!(place.country, "US");
        assert_eq!(place.latitude, 37.769);
        assert_eq!(place.longitude, -122.483);
        assert_eq!(place.min_latitude, 37.764);
        assert_eq!(place.min_longitude, -122.511);
        assert_eq!(place.max_latitude, 37.774);
        assert_eq!(place.max_longitude, -122.454);
        assert_eq!(place.is_current, ExistentialFlag::True);
        assert_eq!(place.is_deprecated, ExistentialFlag::Unknown);
        assert_eq!(place.is_ceased, ExistentialFlag::False);
        assert_eq!(place.path, "101/101.geojson");
        assert_eq!(place.last_modified, 1600000000);
        assert!(place.supersedes.is_empty());
    }

    #[test]
    fn test_flag_columns_decode_independently() {
        let (db, _, spr) = setup();
        let columns = [
            "is_current",
            "is_deprecated",
            "is_ceased",
            "is_superseded",
            "is_superseding",
        ];

        let mut id = 1;
        for (target, column) in columns.iter().enumerate() {
            for stored in [-1, 0, 1] {
                // Every other flag holds a value different from the one under test
                let other = if stored == 1 { 0 } else { 1 };

                db.with_connection(|conn| {
                    conn.execute(
                        &format!(
                            "INSERT INTO {} (id, is_current, is_deprecated, is_ceased, is_superseded, is_superseding, alt_label)
                             VALUES (?1, ?2, ?2, ?2, ?2, ?2, '')",
                            SPR_TABLE_NAME
                        ),
                        params![id, other],
                    )?;
                    conn.execute(
                        &format!("UPDATE {} SET {} = ?1 WHERE id = ?2", SPR_TABLE_NAME, column),
                        params![stored, id],
                    )?;
                    Ok(())
                })
                .unwrap();

                let place = db.with_connection(|conn| spr.retrieve(conn, id, "")).unwrap();
                let decoded = [
                    place.is_current,
                    place.is_deprecated,
                    place.is_ceased,
                    place.is_superseded,
                    place.is_superseding,
                ];

                for (index, flag) in decoded.iter().enumerate() {
                    let expected = if index == target { stored } else { other };
                    assert_eq!(
                        *flag,
                        ExistentialFlag::from_i64(expected),
                        "{} with {} = {}",
                        columns[index],
                        column,
                        stored
                    );
                }

                id += 1;
            }
        }
    }

    #[test]
    fn test_retrieve_by_alt_label() {
        let (db, _, spr) = setup();

        db.with_connection(|conn| {
            spr.index_record(conn, &feature(101, "Golden Gate Park", ""))?;
            spr.index_record(conn, &feature(101, "Golden Gate Park (OSM)", "osm"))?;
            Ok(())
        })
        .unwrap();

        let primary = db.with_connection(|conn| spr.retrieve(conn, 101, "")).unwrap();
        let alt = db.with_connection(|conn| spr.retrieve(conn, 101, "osm")).unwrap();

        assert_eq!(primary.name, "Golden Gate Park");
        assert_eq!(alt.name, "Golden Gate Park (OSM)");
        assert_eq!(alt.path, "101/101-alt-osm.geojson");
    }

    #[test]
    fn test_retrieve_missing() {
        let (db, _, spr) = setup();

        let err = db.with_connection(|conn| spr.retrieve(conn, 404, "")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 404, .. }));
    }
}
