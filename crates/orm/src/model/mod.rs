//! Model system - metadata, per-instance storage, and lifecycle
//!
//! - `field`: descriptor table entries and typed field tags
//! - `storage`: per-instance row cache, write staging, and existence flag
//! - `core_trait`: the core Model trait
//! - `crud_operations`: identity-aware create/update/delete lifecycle

pub mod core_trait;
pub mod crud_operations;
pub mod field;
pub mod storage;

// Re-export main types and traits for convenience
pub use core_trait::{IdValue, Model};
pub use crud_operations::CrudOperations;
pub use field::{
    ColumnType, Field, FieldConstraint, FieldDescriptor, FieldRole, FieldType, FieldValue,
};
pub use storage::ModelStorage;

pub(crate) use field::deleted_at_field;
