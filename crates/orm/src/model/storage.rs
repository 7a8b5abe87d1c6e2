//! Per-instance model storage
//!
//! Every model instance carries a `ModelStorage`: the cached row it was
//! decoded from (present iff the instance was loaded from or just written to
//! storage), the values staged for the next write, and the existence flag.
//! Write staging is rebuilt by the lifecycle operations on every write;
//! application code never mutates it directly.

use std::sync::Arc;

use crate::backends::{DatabaseRow, DatabaseValue};

/// Decoded-row cache, write staging, and existence flag for one instance
#[derive(Debug, Clone, Default)]
pub struct ModelStorage {
    pub(crate) output: Option<Arc<dyn DatabaseRow>>,
    pub(crate) input: Vec<(String, DatabaseValue)>,
    pub(crate) exists: bool,
}

impl ModelStorage {
    /// Empty storage for a not-yet-persisted instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the instance corresponds to a persisted row
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// The row this instance was decoded from, if any
    pub fn output(&self) -> Option<&Arc<dyn DatabaseRow>> {
        self.output.as_ref()
    }

    /// Values staged for the next write, in descriptor-table order
    pub fn input(&self) -> &[(String, DatabaseValue)] {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_storage_is_unpersisted() {
        let storage = ModelStorage::new();
        assert!(!storage.exists());
        assert!(storage.output().is_none());
        assert!(storage.input().is_empty());
    }
}
