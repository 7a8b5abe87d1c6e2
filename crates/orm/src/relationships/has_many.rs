//! HasMany - one-to-many relation holder and descriptor
//!
//! The parent side of a one-to-many relation has no local storage; it is
//! resolved purely by querying the child entity filtered by the parent's
//! identifier. The holder keeps the loaded children once resolution ran.

use crate::model::Model;

/// One-to-many relation holder on the parent model
#[derive(Debug, Clone, Default)]
pub struct HasMany<M: Model> {
    loaded: Option<Vec<M>>,
}

impl<M: Model> HasMany<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded children.
    ///
    /// Panics when the relation was not eagerly loaded.
    #[track_caller]
    pub fn get(&self) -> &[M] {
        self.loaded.as_deref().expect("association not loaded")
    }

    /// The loaded children, if the relation was eagerly loaded
    pub fn loaded(&self) -> Option<&[M]> {
        self.loaded.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub(crate) fn set_loaded(&mut self, models: Vec<M>) {
        self.loaded = Some(models);
    }
}

/// Const descriptor of a one-to-many relation, declared on the parent model
pub struct HasManyDef<P: Model, C: Model> {
    pub(crate) foreign_key: &'static str,
    pub(crate) children_mut: fn(&mut P) -> &mut HasMany<C>,
    pub(crate) child_key: fn(&C) -> &P::Id,
}

impl<P: Model, C: Model> HasManyDef<P, C> {
    pub const fn new(
        foreign_key: &'static str,
        children_mut: fn(&mut P) -> &mut HasMany<C>,
        child_key: fn(&C) -> &P::Id,
    ) -> Self {
        Self {
            foreign_key,
            children_mut,
            child_key,
        }
    }

    /// Storage name of the foreign-key field on the child
    pub fn foreign_key(&self) -> &'static str {
        self.foreign_key
    }

    pub(crate) fn children_mut<'m>(&self, model: &'m mut P) -> &'m mut HasMany<C> {
        (self.children_mut)(model)
    }

    pub(crate) fn child_key<'m>(&self, child: &'m C) -> &'m P::Id {
        (self.child_key)(child)
    }
}

impl<P: Model, C: Model> Clone for HasManyDef<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Model, C: Model> Copy for HasManyDef<P, C> {}
