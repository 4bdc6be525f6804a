//! Built-in backends
//!
//! | Scheme | URI | Gateway |
//! |--------|-----|---------|
//! | `sqlite` | `sqlite://?dsn=places.db` | `SqliteGateway` |
//! | `null` | `null://` | `NullGateway` |

use futures::future::{BoxFuture, FutureExt};
use placeseek_store::{NullGateway, SqliteConfig, SqliteGateway};
use tracing::warn;
use url::Url;

use crate::database::FullTextDatabase;
use crate::engine::FullTextEngine;
use crate::error::Result;
use crate::registry::{DatabaseConstructor, DatabaseRegistry};

pub const SQLITE_SCHEME: &str = "sqlite";
pub const NULL_SCHEME: &str = "null";

/// SQLite-backed full-text database
pub type SqliteFullTextDatabase = FullTextEngine<SqliteGateway>;

/// Full-text database that discards writes and matches nothing
pub type NullFullTextDatabase = FullTextEngine<NullGateway>;

pub(crate) fn register_builtin(registry: &DatabaseRegistry) {
    let builtin: [(&str, DatabaseConstructor); 2] = [
        (SQLITE_SCHEME, new_sqlite_database),
        (NULL_SCHEME, new_null_database),
    ];

    for (scheme, constructor) in builtin {
        if let Err(e) = registry.register(scheme, constructor) {
            warn!("Built-in backend {} not registered: {}", scheme, e);
        }
    }
}

/// Open a SQLite full-text database
///
/// The `dsn` parameter is validated before the database file is touched.
pub fn new_sqlite_database(url: Url) -> BoxFuture<'static, Result<Box<dyn FullTextDatabase>>> {
    open_sqlite(url).boxed()
}

/// Open a null full-text database
pub fn new_null_database(url: Url) -> BoxFuture<'static, Result<Box<dyn FullTextDatabase>>> {
    open_null(url).boxed()
}

async fn open_sqlite(url: Url) -> Result<Box<dyn FullTextDatabase>> {
    let config = SqliteConfig::from_url(&url)?;
    let gateway = tokio::task::spawn_blocking(move || SqliteGateway::open(&config)).await??;
    Ok(Box::new(FullTextEngine::new(gateway)))
}

async fn open_null(_url: Url) -> Result<Box<dyn FullTextDatabase>> {
    Ok(Box::new(FullTextEngine::new(NullGateway::new())))
}
