//! # filament-orm: storage-agnostic ORM core
//!
//! The query-construction and relationship-loading core of an ORM: typed
//! models are persisted, queried, filtered, joined, and have related rows
//! eagerly loaded, while staying agnostic of the concrete storage engine and
//! wire dialect. SQL generation, pooling, and transactions belong to the
//! storage driver behind the [`Database`] boundary.

pub mod backends;
pub mod error;
pub mod model;
pub mod query;
pub mod relationships;
pub mod schema;

// Re-export core traits and types
pub use backends::*;
pub use error::*;
pub use model::*;
pub use query::*;
pub use relationships::*;
pub use schema::*;
