//! Schema representation
//!
//! A thin, inert description of one entity's shape, derived from the model's
//! descriptor table and consumed by the storage boundary's schema execution.
//! DDL generation itself belongs to the storage engine.

use crate::model::{ColumnType, FieldConstraint, Model};

/// Schema actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaAction {
    Create,
    Drop,
}

/// One field definition in a schema description
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub data_type: Option<ColumnType>,
    pub constraints: Vec<FieldConstraint>,
}

/// Storage-agnostic description of one schema operation
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSchema {
    pub entity: String,
    pub action: SchemaAction,
    pub fields: Vec<SchemaField>,
}

impl DatabaseSchema {
    /// Create-entity description from a model's descriptor table
    pub fn create<M: Model>() -> Self {
        Self {
            entity: M::entity().to_string(),
            action: SchemaAction::Create,
            fields: M::fields()
                .iter()
                .map(|f| SchemaField {
                    name: f.storage_name().to_string(),
                    data_type: f.data_type,
                    constraints: f.constraints.to_vec(),
                })
                .collect(),
        }
    }

    /// Drop-entity description for a model
    pub fn drop<M: Model>() -> Self {
        Self {
            entity: M::entity().to_string(),
            action: SchemaAction::Drop,
            fields: Vec::new(),
        }
    }

    /// Storage name of the identifier field, if declared
    pub fn identifier(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.constraints.contains(&FieldConstraint::Identifier))
            .map(|f| f.name.as_str())
    }
}
