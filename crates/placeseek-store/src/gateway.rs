//! Places gateway - the storage capabilities the search engine relies on
//!
//! A backend only has to implement `PlacesGateway`; matching, hydration
//! fan-out and write exclusion live in the search engine on top of it.
//! Every method is blocking and may be called from many threads at once.

use placeseek_core::{Feature, PlaceResult};
use tracing::info;

use crate::config::SqliteConfig;
use crate::database::SqliteDatabase;
use crate::error::{Result, StoreError};
use crate::tables::{SearchTable, SprTable, Table};

/// Minimal storage capability set behind a full-text database
pub trait PlacesGateway: Send + Sync + 'static {
    /// Short backend name for diagnostics
    fn name(&self) -> &str;

    /// Upsert `feature` into the searchable text table
    fn index_search(&self, feature: &Feature) -> Result<()>;

    /// Upsert `feature` into the result table
    fn index_result(&self, feature: &Feature) -> Result<()>;

    /// Ids matching `term`; their order is authoritative
    fn match_ids(&self, term: &str) -> Result<Vec<i64>>;

    /// Hydrate one place keyed by `(id, alt_label)`
    fn retrieve_place(&self, id: i64, alt_label: &str) -> Result<PlaceResult>;

    /// Release the underlying connection
    fn close(&self) -> Result<()>;
}

/// Gateway over a SQLite database with a search table and an spr table
///
/// All calls share one connection, so concurrent hydrations for a query
/// reach SQLite one at a time.
#[derive(Debug)]
pub struct SqliteGateway {
    db: SqliteDatabase,
    search_table: SearchTable,
    spr_table: SprTable,
}

impl SqliteGateway {
    /// Open the database and make sure both tables exist
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let db = SqliteDatabase::open(config)?;
        Self::with_database(db)
    }

    pub fn with_database(db: SqliteDatabase) -> Result<Self> {
        let search_table = SearchTable::with_database(&db)?;
        let spr_table = SprTable::with_database(&db)?;

        Ok(Self {
            db,
            search_table,
            spr_table,
        })
    }

    pub fn database(&self) -> &SqliteDatabase {
        &self.db
    }
}

impl PlacesGateway for SqliteGateway {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn index_search(&self, feature: &Feature) -> Result<()> {
        self.db
            .with_connection(|conn| self.search_table.index_record(conn, feature))
    }

    fn index_result(&self, feature: &Feature) -> Result<()> {
        self.db
            .with_connection(|conn| self.spr_table.index_record(conn, feature))
    }

    fn match_ids(&self, term: &str) -> Result<Vec<i64>> {
        self.db
            .with_connection(|conn| self.search_table.match_ids(conn, term))
    }

    fn retrieve_place(&self, id: i64, alt_label: &str) -> Result<PlaceResult> {
        self.db
            .with_connection(|conn| self.spr_table.retrieve(conn, id, alt_label))
    }

    fn close(&self) -> Result<()> {
        self.db.close()
    }
}

/// Gateway that stores nothing and matches nothing
#[derive(Debug, Default)]
pub struct NullGateway;

impl NullGateway {
    pub fn new() -> Self {
        info!("Using null places gateway; writes are discarded");
        Self
    }
}

impl PlacesGateway for NullGateway {
    fn name(&self) -> &str {
        "null"
    }

    fn index_search(&self, _feature: &Feature) -> Result<()> {
        Ok(())
    }

    fn index_result(&self, _feature: &Feature) -> Result<()> {
        Ok(())
    }

    fn match_ids(&self, _term: &str) -> Result<Vec<i64>> {
        Ok(Vec::new())
    }

    fn retrieve_place(&self, id: i64, alt_label: &str) -> Result<PlaceResult> {
        Err(StoreError::NotFound {
            id,
            alt_label: alt_label.to_string(),
        })
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn feature(id: i64, name: &str) -> Feature {
        Feature::from_value(json!({
            "properties": {
                "wof:id": id,
                "wof:name": name,
                "wof:placetype": "locality",
                "wof:country": "US",
                "geom:latitude": 37.7,
                "geom:longitude": -122.4
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_sqlite_gateway_round_trip() {
        let gateway = SqliteGateway::open(&SqliteConfig::in_memory()).unwrap();
        let f = feature(85922583, "San Francisco");

        gateway.index_search(&f).unwrap();
        gateway.index_result(&f).unwrap();

        let ids = gateway.match_ids("francisco").unwrap();
        assert_eq!(ids, vec![85922583]);

        let place = gateway.retrieve_place(85922583, "").unwrap();
        assert_eq!(place.name, "San Francisco");
        assert_eq!(place.path, "859/225/83/85922583.geojson");
        assert!(place.is_point());
    }

    #[test]
    fn test_sqlite_gateway_persists_to_disk() {
        let dir = tempdir().unwrap();
        let config = SqliteConfig::new(dir.path().join("places.db").to_string_lossy());

        let gateway = SqliteGateway::open(&config).unwrap();
        gateway.index_search(&feature(1, "Oakland")).unwrap();
        gateway.index_result(&feature(1, "Oakland")).unwrap();
        gateway.close().unwrap();

        let gateway = SqliteGateway::open(&config).unwrap();
        assert_eq!(gateway.match_ids("oakland").unwrap(), vec![1]);
    }

    #[test]
    fn test_closed_gateway_fails_cleanly() {
        let gateway = SqliteGateway::open(&SqliteConfig::in_memory()).unwrap();
        gateway.close().unwrap();

        assert!(matches!(gateway.match_ids("x"), Err(StoreError::Closed)));
        assert!(matches!(
            gateway.index_result(&feature(1, "Oakland")),
            Err(StoreError::Closed)
        ));
    }

    #[test]
    fn test_null_gateway() {
        let gateway = NullGateway::new();
        gateway.index_search(&feature(1, "Oakland")).unwrap();
        gateway.index_result(&feature(1, "Oakland")).unwrap();

        assert!(gateway.match_ids("oakland").unwrap().is_empty());
        assert!(gateway.retrieve_place(1, "").is_err());
        gateway.close().unwrap();
    }
}
