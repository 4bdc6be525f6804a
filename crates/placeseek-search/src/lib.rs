//! Placeseek Search - Full-text query engine and backend registry
//!
//! This crate provides:
//! - `FullTextDatabase`: the capability every backend exposes
//! - `FullTextEngine`: indexer and scatter/gather query engine over a gateway
//! - A registry that opens a backend from its connection URI
//! - The built-in `sqlite` and `null` backends
//!
//! # Example
//!
//! ```rust,ignore
//! let db = placeseek_search::new_database("sqlite://?dsn=places.db").await?;
//! db.index_feature(&feature).await?;
//!
//! let results = db.query_string("golden", &[]).await?;
//! for place in &results {
//!     println!("{} {}", place.id(), place.name());
//! }
//! ```

pub mod backends;
pub mod database;
pub mod engine;
pub mod error;
pub mod registry;

pub use backends::*;
pub use database::*;
pub use engine::*;
pub use error::*;
pub use registry::*;
