//! Query builder execution
//!
//! `run` freezes a snapshot of the assembled query, submits it to the storage
//! boundary, decodes arriving rows into model instances, invokes the per-row
//! callback synchronously, and resolves every declared eager load against the
//! complete batch once all rows have been consumed. The builder itself stays
//! reusable; in-flight executions never observe later mutation.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backends::{DatabaseRowExt, AGGREGATE_KEY};
use crate::error::OrmResult;
use crate::model::{Field, FieldValue, Model};
use crate::query::builder::QueryBuilder;
use crate::query::decorators;
use crate::query::types::{AggregateMethod, QueryField};

impl<'a, M: Model> QueryBuilder<'a, M> {
    /// Execute the query, invoking `on_row` for each decoded model as it
    /// arrives, and return the complete batch with eager loads resolved.
    ///
    /// The callback observes models before relationship resolution; the
    /// returned batch observes them after.
    pub async fn run<F>(&self, mut on_row: F) -> OrmResult<Vec<M>>
    where
        F: FnMut(&M) -> OrmResult<()> + Send,
    {
        let mut query = self.query.clone();
        decorators::apply_read_decorators::<M>(&mut query, self.include_deleted, &self.joined);

        debug!(entity = %query.entity, action = ?query.action, "executing query");

        let mut all: Vec<M> = Vec::new();
        self.database
            .execute(&query, &mut |row| {
                let mut model = M::from_row(row.as_ref())?;
                let storage = model.storage_mut();
                storage.output = Some(row);
                storage.exists = true;
                on_row(&model)?;
                all.push(model);
                Ok(())
            })
            .await?;

        debug!(entity = %query.entity, rows = all.len(), "query complete");

        // every declared relation resolves against the complete batch, or the
        // whole fetch fails
        for eager_load in &self.eager_loads {
            eager_load.run(&mut all, self.database).await?;
        }

        Ok(all)
    }

    /// Fetch all matching models
    pub async fn all(&self) -> OrmResult<Vec<M>> {
        self.run(|_| Ok(())).await
    }

    /// Fetch the first matching model, if any
    pub async fn first(&self) -> OrmResult<Option<M>> {
        Ok(self.all().await?.into_iter().next())
    }

    /// Fetch in batches of at most `max`, invoking the callback once per full
    /// batch in arrival order plus once for a trailing partial batch — never
    /// with an empty batch.
    pub async fn chunk<F>(&self, max: usize, mut callback: F) -> OrmResult<()>
    where
        F: FnMut(Vec<M>) -> OrmResult<()> + Send,
    {
        assert!(max > 0, "chunk size must be positive");

        let mut partial: Vec<M> = Vec::with_capacity(max);
        self.run(|model| {
            partial.push(model.clone());
            if partial.len() >= max {
                callback(std::mem::take(&mut partial))?;
            }
            Ok(())
        })
        .await?;

        if !partial.is_empty() {
            callback(partial)?;
        }
        Ok(())
    }

    /// Count matching rows. Never optional: an empty set counts zero.
    pub async fn count(&self) -> OrmResult<i64> {
        let counted = self
            .aggregate::<i64>(AggregateMethod::Count, M::id_field_name())
            .await?;
        Ok(counted.unwrap_or(0))
    }

    /// Sum a field over matching rows; `None` when the set is empty or the
    /// result is null
    pub async fn sum<V>(&self, field: Field<M, V>) -> OrmResult<Option<V>>
    where
        V: FieldValue,
    {
        self.aggregate(AggregateMethod::Sum, field.storage_name()).await
    }

    /// Average a field over matching rows; `None` when the set is empty
    pub async fn average<V>(&self, field: Field<M, V>) -> OrmResult<Option<f64>>
    where
        V: FieldValue,
    {
        self.aggregate(AggregateMethod::Average, field.storage_name())
            .await
    }

    /// Minimum of a field over matching rows; `None` when the set is empty
    pub async fn min<V>(&self, field: Field<M, V>) -> OrmResult<Option<V>>
    where
        V: FieldValue,
    {
        self.aggregate(AggregateMethod::Minimum, field.storage_name())
            .await
    }

    /// Maximum of a field over matching rows; `None` when the set is empty
    pub async fn max<V>(&self, field: Field<M, V>) -> OrmResult<Option<V>>
    where
        V: FieldValue,
    {
        self.aggregate(AggregateMethod::Maximum, field.storage_name())
            .await
    }

    /// Execute with the projection replaced by a single synthetic aggregate
    /// field and decode the designated output key from the one result row.
    ///
    /// Aggregate rows are not model rows: they bypass model decoding and
    /// never trigger eager loads.
    async fn aggregate<R>(&self, method: AggregateMethod, field_name: &str) -> OrmResult<Option<R>>
    where
        R: DeserializeOwned + Send,
    {
        let mut query = self.query.clone();
        decorators::apply_read_decorators::<M>(&mut query, self.include_deleted, &self.joined);
        query.fields = vec![QueryField::Aggregate {
            method,
            field: Box::new(QueryField::column(field_name, M::entity())),
        }];

        debug!(entity = %query.entity, method = %method, field = field_name, "executing aggregate");

        let mut result: Option<R> = None;
        let mut first = true;
        self.database
            .execute(&query, &mut |row| {
                if first {
                    first = false;
                    result = row.as_ref().try_get(AGGREGATE_KEY)?;
                }
                Ok(())
            })
            .await?;
        Ok(result)
    }
}
