//! Component queries
//!
//! A query names a tuple of component types and yields every entity holding
//! all of them. Iteration starts from whichever requested map is smallest and
//! probes the others, so a query over `(Transform, BossState)` walks the
//! handful of bosses rather than every transform.

use std::marker::PhantomData;

use super::components::{Component, ComponentKind, Components};
use super::entity::EntityId;

/// A tuple of component types that can be fetched together
pub trait Query {
    type Item<'w>;

    /// Discriminants of every requested variant
    fn kinds() -> Vec<ComponentKind>;

    /// Fetch all requested components for `id`, or `None` if any is missing
    fn fetch(components: &Components, id: EntityId) -> Option<Self::Item<'_>>;
}

macro_rules! impl_query {
    ($($t:ident),+) => {
        impl<$($t: Component),+> Query for ($($t,)+) {
            type Item<'w> = ($(&'w $t,)+);

            fn kinds() -> Vec<ComponentKind> {
                vec![$($t::KIND),+]
            }

            fn fetch(components: &Components, id: EntityId) -> Option<Self::Item<'_>> {
                Some(($($t::storage(components).get(id)?,)+))
            }
        }
    };
}

impl_query!(A);
impl_query!(A, B);
impl_query!(A, B, C);
impl_query!(A, B, C, D);
impl_query!(A, B, C, D, E);

/// Lazy query result
pub struct QueryIter<'w, Q: Query> {
    components: &'w Components,
    candidates: Box<dyn Iterator<Item = EntityId> + 'w>,
    _query: PhantomData<Q>,
}

impl<'w, Q: Query> QueryIter<'w, Q> {
    pub fn new(components: &'w Components) -> Self {
        let candidates: Box<dyn Iterator<Item = EntityId> + 'w> =
            match components.smallest_of(&Q::kinds()) {
                Some(primary) => components.ids_of(primary),
                None => Box::new(std::iter::empty()),
            };
        Self {
            components,
            candidates,
            _query: PhantomData,
        }
    }
}

impl<'w, Q: Query> Iterator for QueryIter<'w, Q> {
    type Item = (EntityId, Q::Item<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        let components = self.components;
        self.candidates
            .by_ref()
            .find_map(|id| Q::fetch(components, id).map(|item| (id, item)))
    }
}

/// Dynamic form: ids holding every kind in `kinds`. An empty request matches
/// nothing.
pub fn query_kinds<'w>(
    components: &'w Components,
    kinds: &'w [ComponentKind],
) -> impl Iterator<Item = EntityId> + 'w {
    let candidates: Box<dyn Iterator<Item = EntityId> + 'w> = match components.smallest_of(kinds) {
        Some(primary) => components.ids_of(primary),
        None => Box::new(std::iter::empty()),
    };
    candidates.filter(move |id| kinds.iter().all(|k| components.contains(*k, *id)))
}
