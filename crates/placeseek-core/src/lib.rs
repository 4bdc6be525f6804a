//! Placeseek Core - Core types shared by every Placeseek layer
//!
//! This crate defines the data that flows through the search stack:
//! - `Feature`: The GeoJSON document handed to the indexer
//! - `PlaceResult`: One hydrated place returned by a query
//! - `PlaceResults`: The ordered result set for a query
//! - `ExistentialFlag`: Tri-state lifecycle flags (unknown / false / true)

pub mod error;
pub mod feature;
pub mod filter;
pub mod flags;
pub mod place;
pub mod uri;

pub use error::*;
pub use feature::*;
pub use filter::*;
pub use flags::*;
pub use place::*;
pub use uri::*;
