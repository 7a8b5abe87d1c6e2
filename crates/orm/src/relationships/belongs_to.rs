//! BelongsTo - many-to-one relation holder and descriptor
//!
//! The child side of a many-to-one relation holds the parent's identifier as
//! a foreign key, plus the loaded parent once an eager load has resolved it.
//! `BelongsToDef` is the const relation descriptor a model declares next to
//! its field tags; it carries both concrete types, so resolution stays fully
//! typed.

use crate::model::Model;

/// Many-to-one relation holder on the child model
#[derive(Debug, Clone, Default)]
pub struct BelongsTo<M: Model> {
    id: M::Id,
    loaded: Option<Box<M>>,
}

impl<M: Model> BelongsTo<M> {
    /// Reference a parent by identifier
    pub fn new(id: M::Id) -> Self {
        Self { id, loaded: None }
    }

    /// Reference a persisted parent instance.
    ///
    /// Panics when the parent has no identifier yet — referencing an unsaved
    /// row is a programming error.
    #[track_caller]
    pub fn to(model: &M) -> Self {
        let id = model
            .id()
            .unwrap_or_else(|| panic!("cannot reference an unsaved `{}` row", M::entity()));
        Self::new(id)
    }

    /// The foreign-key value
    pub fn id(&self) -> &M::Id {
        &self.id
    }

    /// Re-point the relation at another parent, discarding any loaded value
    pub fn set_id(&mut self, id: M::Id) {
        self.id = id;
        self.loaded = None;
    }

    /// The loaded parent.
    ///
    /// Panics when the relation was not eagerly loaded.
    #[track_caller]
    pub fn get(&self) -> &M {
        self.loaded.as_deref().expect("association not loaded")
    }

    /// The loaded parent, if the relation was eagerly loaded
    pub fn loaded(&self) -> Option<&M> {
        self.loaded.as_deref()
    }

    pub(crate) fn set_loaded(&mut self, model: M) {
        self.loaded = Some(Box::new(model));
    }
}

/// Const descriptor of a many-to-one relation, declared on the child model
pub struct BelongsToDef<C: Model, P: Model> {
    pub(crate) foreign_key: &'static str,
    pub(crate) relation: fn(&C) -> &BelongsTo<P>,
    pub(crate) relation_mut: fn(&mut C) -> &mut BelongsTo<P>,
}

impl<C: Model, P: Model> BelongsToDef<C, P> {
    pub const fn new(
        foreign_key: &'static str,
        relation: fn(&C) -> &BelongsTo<P>,
        relation_mut: fn(&mut C) -> &mut BelongsTo<P>,
    ) -> Self {
        Self {
            foreign_key,
            relation,
            relation_mut,
        }
    }

    /// Storage name of the foreign-key field on the child
    pub fn foreign_key(&self) -> &'static str {
        self.foreign_key
    }

    pub(crate) fn id_of<'m>(&self, model: &'m C) -> &'m P::Id {
        (self.relation)(model).id()
    }

    pub(crate) fn relation_mut<'m>(&self, model: &'m mut C) -> &'m mut BelongsTo<P> {
        (self.relation_mut)(model)
    }
}

impl<C: Model, P: Model> Clone for BelongsToDef<C, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Model, P: Model> Copy for BelongsToDef<C, P> {}
