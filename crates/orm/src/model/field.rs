//! Field metadata - per-model, per-field descriptors
//!
//! Every model registers an ordered, compile-time descriptor table
//! (`Model::fields`) describing each persisted member: its label, optional
//! declared storage name, semantic value type, optional storage-type hint,
//! constraints, and role. The query builder resolves typed [`Field`] tags
//! against this table; an unknown tag is a programming error and panics.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::backends::DatabaseValue;
use crate::model::Model;

/// Semantic value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    BigInt,
    Double,
    String,
    Uuid,
    DateTime,
    Json,
    Bytes,
}

/// Optional storage-type hint for schema generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Integer,
    BigInteger,
    DoublePrecision,
    Text,
    VarChar(u32),
    Uuid,
    TimestampTz,
    JsonB,
    Bytea,
}

/// Field constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldConstraint {
    Required,
    Unique,
    Identifier,
}

/// Declarative role of a field, driving query decorators and write staging.
///
/// `CreatedAt`/`UpdatedAt` fields are stamped on create/update; a `DeletedAt`
/// field turns deletes into soft deletes and excludes trashed rows from
/// reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Data,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

/// Metadata for one persisted model member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Member label the field was declared under
    pub label: &'static str,
    /// Declared storage name, when it differs from the label
    pub name: Option<&'static str>,
    /// Semantic value type
    pub value_type: FieldType,
    /// Optional storage-type hint
    pub data_type: Option<ColumnType>,
    /// Constraint set
    pub constraints: &'static [FieldConstraint],
    /// Declarative role
    pub role: FieldRole,
}

impl FieldDescriptor {
    pub const fn new(label: &'static str, value_type: FieldType) -> Self {
        Self {
            label,
            name: None,
            value_type,
            data_type: None,
            constraints: &[],
            role: FieldRole::Data,
        }
    }

    /// Declare an explicit storage name
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Attach a storage-type hint
    pub const fn data_type(mut self, data_type: ColumnType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Attach constraints
    pub const fn constraints(mut self, constraints: &'static [FieldConstraint]) -> Self {
        self.constraints = constraints;
        self
    }

    /// Attach a declarative role
    pub const fn role(mut self, role: FieldRole) -> Self {
        self.role = role;
        self
    }

    /// Effective storage name: the declared name if present, else the label
    pub fn storage_name(&self) -> &'static str {
        self.name.unwrap_or(self.label)
    }

    pub fn has_constraint(&self, constraint: FieldConstraint) -> bool {
        self.constraints.contains(&constraint)
    }

    pub fn is_identifier(&self) -> bool {
        self.has_constraint(FieldConstraint::Identifier)
    }
}

/// Marker bound for values a typed field can carry
pub trait FieldValue: Clone + Send + Sync + DeserializeOwned + Into<DatabaseValue> + 'static {}

impl<T> FieldValue for T where T: Clone + Send + Sync + DeserializeOwned + Into<DatabaseValue> + 'static {}

/// Typed, const field tag declared alongside a model.
///
/// A tag is resolved against the owning model's descriptor table by label;
/// resolution yields the same descriptor on every lookup. Resolving a tag
/// whose label is not in the table panics — it indicates a mismatch between
/// the compile-time tag and the registered metadata, with no recoverable
/// path.
pub struct Field<M, V> {
    label: &'static str,
    _marker: PhantomData<fn() -> (M, V)>,
}

impl<M, V> Clone for Field<M, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, V> Copy for Field<M, V> {}

impl<M: Model, V: FieldValue> Field<M, V> {
    pub const fn new(label: &'static str) -> Self {
        Self {
            label,
            _marker: PhantomData,
        }
    }

    /// Resolve the descriptor this tag denotes
    #[track_caller]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        M::fields()
            .iter()
            .find(|descriptor| descriptor.label == self.label)
            .unwrap_or_else(|| {
                panic!(
                    "no field `{}` in the descriptor table of `{}`",
                    self.label,
                    M::entity()
                )
            })
    }

    /// Effective storage name of the denoted field
    #[track_caller]
    pub fn storage_name(&self) -> &'static str {
        self.descriptor().storage_name()
    }
}

/// Find the soft-delete field of a descriptor table, if any
pub(crate) fn deleted_at_field(fields: &'static [FieldDescriptor]) -> Option<&'static FieldDescriptor> {
    fields.iter().find(|f| f.role == FieldRole::DeletedAt)
}
