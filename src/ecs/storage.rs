//! Per-variant component map

use std::collections::BTreeMap;

use super::entity::EntityId;

/// One component map. Keyed by id, so iteration order is ascending id, which
/// for monotonic ids is the order entities were created in.
#[derive(Debug, Clone)]
pub struct Storage<T> {
    map: BTreeMap<EntityId, T>,
}

impl<T> Default for Storage<T> {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<T> Storage<T> {
    /// Attach or overwrite. Returns the replaced instance, if any.
    pub fn insert(&mut self, id: EntityId, value: T) -> Option<T> {
        self.map.insert(id, value)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.map.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.map.get_mut(&id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.map.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.map.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.map.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.map.iter().map(|(id, v)| (*id, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.map.iter_mut().map(|(id, v)| (*id, v))
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}
