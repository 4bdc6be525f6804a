//! Placeseek Store - Storage gateway for the full-text search layer
//!
//! This crate provides:
//! - Connection configuration parsed from a connection URI
//! - A SQLite connection wrapper shared by the tables
//! - The search table (FTS) and the result ("spr") table
//! - The `PlacesGateway` capability set the search engine is built on

pub mod config;
pub mod database;
pub mod error;
pub mod gateway;
pub mod tables;

pub use config::*;
pub use database::*;
pub use error::*;
pub use gateway::*;
pub use tables::*;
