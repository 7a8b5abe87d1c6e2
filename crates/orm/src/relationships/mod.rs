//! Relationships between models
//!
//! Many-to-one (`BelongsTo`) and one-to-many (`HasMany`) relations, their
//! const descriptors, and the eager-load engine resolving them per batch.

pub mod belongs_to;
pub mod eager_loading;
pub mod has_many;

pub use belongs_to::{BelongsTo, BelongsToDef};
pub use has_many::{HasMany, HasManyDef};

pub(crate) use eager_loading::{EagerLoad, JoinedBelongsTo, SubqueryBelongsTo, SubqueryHasMany};
