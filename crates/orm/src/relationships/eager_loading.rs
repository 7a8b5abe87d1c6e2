//! Eager-load engine
//!
//! Each declared relation resolves with one-shot semantics: its data is
//! fetched once per top-level query — either read out of the already-joined,
//! alias-prefixed columns, or via a single follow-up query over the
//! deduplicated key set — then distributed by key to every owning model in
//! the batch. Any relation failing fails the whole fetch; partial eager data
//! is never exposed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::backends::{Database, DatabaseRow, DatabaseValue};
use crate::error::{ModelError, OrmResult};
use crate::model::Model;
use crate::query::QueryOperator;
use crate::relationships::{BelongsToDef, HasManyDef};

/// One declared relation, resolvable against a complete result batch
#[async_trait]
pub(crate) trait EagerLoad<M: Model>: Send + Sync {
    async fn run(&self, models: &mut [M], database: &dyn Database) -> OrmResult<()>;
}

/// Result-row view reading columns under an entity prefix
#[derive(Debug)]
struct PrefixedRow {
    inner: Arc<dyn DatabaseRow>,
    prefix: String,
}

impl PrefixedRow {
    fn new(inner: Arc<dyn DatabaseRow>, prefix: String) -> Self {
        Self { inner, prefix }
    }
}

impl DatabaseRow for PrefixedRow {
    fn contains(&self, column: &str) -> bool {
        self.inner.contains(&format!("{}{}", self.prefix, column))
    }

    fn get_by_name(&self, column: &str) -> OrmResult<DatabaseValue> {
        self.inner.get_by_name(&format!("{}{}", self.prefix, column))
    }

    fn column_names(&self) -> Vec<String> {
        self.inner
            .column_names()
            .into_iter()
            .filter_map(|name| name.strip_prefix(&self.prefix).map(str::to_string))
            .collect()
    }
}

/// Parent relation resolved from the already-joined columns of the current
/// rows; no additional round trip.
pub(crate) struct JoinedBelongsTo<C: Model, P: Model> {
    def: BelongsToDef<C, P>,
}

impl<C: Model, P: Model> JoinedBelongsTo<C, P> {
    pub(crate) fn new(def: BelongsToDef<C, P>) -> Self {
        Self { def }
    }
}

#[async_trait]
impl<C: Model, P: Model> EagerLoad<C> for JoinedBelongsTo<C, P> {
    async fn run(&self, models: &mut [C], _database: &dyn Database) -> OrmResult<()> {
        let mut cache: HashMap<P::Id, P> = HashMap::new();

        for model in models.iter_mut() {
            let output = model.storage().output().cloned().ok_or_else(|| {
                ModelError::Relationship(format!(
                    "`{}` row has no cached output to read joined `{}` columns from",
                    C::entity(),
                    P::entity()
                ))
            })?;
            let key = self.def.id_of(model).clone();
            let parent = match cache.get(&key) {
                Some(parent) => parent.clone(),
                None => {
                    let prefixed: Arc<dyn DatabaseRow> =
                        Arc::new(PrefixedRow::new(output, format!("{}_", P::entity())));
                    let mut parent = P::from_row(prefixed.as_ref())?;
                    let storage = parent.storage_mut();
                    storage.output = Some(prefixed);
                    storage.exists = true;
                    cache.insert(key.clone(), parent.clone());
                    parent
                }
            };
            self.def.relation_mut(model).set_loaded(parent);
        }

        debug!(
            child = C::entity(),
            parent = P::entity(),
            parents = cache.len(),
            "resolved parent relation from joined columns"
        );
        Ok(())
    }
}

/// Parent relation resolved via one follow-up query over the deduplicated
/// foreign-key set.
pub(crate) struct SubqueryBelongsTo<C: Model, P: Model> {
    def: BelongsToDef<C, P>,
}

impl<C: Model, P: Model> SubqueryBelongsTo<C, P> {
    pub(crate) fn new(def: BelongsToDef<C, P>) -> Self {
        Self { def }
    }
}

#[async_trait]
impl<C: Model, P: Model> EagerLoad<C> for SubqueryBelongsTo<C, P> {
    async fn run(&self, models: &mut [C], database: &dyn Database) -> OrmResult<()> {
        if models.is_empty() {
            return Ok(());
        }

        let mut seen: HashSet<P::Id> = HashSet::new();
        let mut keys: Vec<DatabaseValue> = Vec::new();
        for model in models.iter() {
            let id = self.def.id_of(model).clone();
            if seen.insert(id.clone()) {
                keys.push(id.into());
            }
        }

        debug!(
            child = C::entity(),
            parent = P::entity(),
            keys = keys.len(),
            "resolving parent relation via subquery"
        );

        let parents = P::query(database)
            .filter_name(
                P::id_field_name(),
                QueryOperator::In,
                DatabaseValue::Array(keys),
            )
            .all()
            .await?;

        for model in models.iter_mut() {
            let key = self.def.id_of(model).clone();
            let parent = parents
                .iter()
                .find(|parent| parent.id().as_ref() == Some(&key))
                .ok_or_else(|| {
                    ModelError::Relationship(format!(
                        "no `{}` row for key {:?}",
                        P::entity(),
                        key
                    ))
                })?;
            self.def.relation_mut(model).set_loaded(parent.clone());
        }
        Ok(())
    }
}

/// Children relation resolved via one follow-up query over the deduplicated
/// parent-identifier set.
pub(crate) struct SubqueryHasMany<P: Model, C: Model> {
    def: HasManyDef<P, C>,
}

impl<P: Model, C: Model> SubqueryHasMany<P, C> {
    pub(crate) fn new(def: HasManyDef<P, C>) -> Self {
        Self { def }
    }
}

#[async_trait]
impl<P: Model, C: Model> EagerLoad<P> for SubqueryHasMany<P, C> {
    async fn run(&self, models: &mut [P], database: &dyn Database) -> OrmResult<()> {
        if models.is_empty() {
            return Ok(());
        }

        let mut seen: HashSet<P::Id> = HashSet::new();
        let mut keys: Vec<DatabaseValue> = Vec::new();
        for model in models.iter() {
            let id = model.id().ok_or_else(|| {
                ModelError::Relationship(format!(
                    "`{}` row has no identifier for a children lookup",
                    P::entity()
                ))
            })?;
            if seen.insert(id.clone()) {
                keys.push(id.into());
            }
        }

        debug!(
            parent = P::entity(),
            child = C::entity(),
            keys = keys.len(),
            "resolving children relation via subquery"
        );

        let children = C::query(database)
            .filter_name(
                self.def.foreign_key(),
                QueryOperator::In,
                DatabaseValue::Array(keys),
            )
            .all()
            .await?;

        for model in models.iter_mut() {
            if let Some(id) = model.id() {
                let matching: Vec<C> = children
                    .iter()
                    .filter(|child| self.def.child_key(child) == &id)
                    .cloned()
                    .collect();
                self.def.children_mut(model).set_loaded(matching);
            }
        }
        Ok(())
    }
}
