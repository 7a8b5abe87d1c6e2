//! Query building and execution
//!
//! The storage-agnostic query representation (`types`), the typed builder
//! over it, and its filter/join/write/eager-load/execution operations.

pub mod builder;
pub mod decorators;
pub mod dml;
pub mod execution;
pub mod joins;
pub mod types;
pub mod where_clause;
pub mod with;

pub use builder::QueryBuilder;
pub use types::{
    AggregateMethod, DatabaseQuery, Filter, GroupOperator, Join, JoinMethod, QueryAction,
    QueryField, QueryOperator,
};
pub use with::EagerLoadMethod;
