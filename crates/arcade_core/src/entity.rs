//! Entity store with generational handles and deferred destruction.
//!
//! Entities live in slots. Each slot carries a generation counter that is
//! bumped when the slot is freed, so an `EntityId` held past its entity's
//! removal resolves to `None` instead of whatever reused the slot.
//!
//! Destruction is two-phase:
//! - `destroy(id)` only flags the entity. It drops out of `alive()` at once,
//!   but its data stays readable so systems mid-loop never see the store
//!   shrink under them.
//! - `sweep()` physically removes flagged entities. Scenes call it exactly
//!   once per tick, after every system has run.
//!
//! Iteration order is creation order, which keeps collision checks and
//! rendering deterministic.

use std::fmt::Debug;

use crate::components::{Components, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct Entity<K> {
    id: EntityId,
    kind: K,
    pending_destroy: bool,
    pub components: Components,
}

impl<K: Copy> Entity<K> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    /// False once `destroy` has been called, even before the sweep.
    pub fn is_active(&self) -> bool {
        !self.pending_destroy
    }
}

#[derive(Debug)]
struct Slot<K> {
    generation: u32,
    entry: Option<Entity<K>>,
}

/// Arena of entities tagged with a closed kind enum `K`.
#[derive(Debug)]
pub struct EntityStore<K> {
    slots: Vec<Slot<K>>,
    free_indices: Vec<u32>,
    order: Vec<EntityId>,
}

impl<K: Copy + Eq + Debug> EntityStore<K> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_indices: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Add a live entity with no components.
    pub fn create(&mut self, kind: K) -> EntityId {
        let id = match self.free_indices.pop() {
            Some(index) => EntityId {
                index,
                generation: self.slots[index as usize].generation,
            },
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: None,
                });
                EntityId {
                    index,
                    generation: 0,
                }
            }
        };
        self.slots[id.index as usize].entry = Some(Entity {
            id,
            kind,
            pending_destroy: false,
            components: Components::default(),
        });
        self.order.push(id);
        log::trace!("create {:?} {:?}", kind, id);
        id
    }

    /// Flag an entity for removal at the next sweep. Returns false if the
    /// handle is stale or the entity was already flagged.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(e) if !e.pending_destroy => {
                e.pending_destroy = true;
                true
            }
            _ => false,
        }
    }

    /// Present and not flagged for destruction.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_active)
    }

    /// Resolve a handle. Entities flagged for destruction still resolve
    /// until the sweep.
    pub fn get(&self, id: EntityId) -> Option<&Entity<K>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity<K>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    pub fn components(&self, id: EntityId) -> Option<&Components> {
        self.get(id).map(|e| &e.components)
    }

    pub fn components_mut(&mut self, id: EntityId) -> Option<&mut Components> {
        self.get_mut(id).map(|e| &mut e.components)
    }

    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.components(id).and_then(|c| c.transform.as_ref())
    }

    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.components_mut(id).and_then(|c| c.transform.as_mut())
    }

    /// Live entities in creation order, optionally of one kind.
    pub fn alive(&self, kind: Option<K>) -> impl Iterator<Item = &Entity<K>> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.get(id))
            .filter(move |e| e.is_active() && kind.map_or(true, |k| e.kind == k))
    }

    /// Snapshot of live handles, for loops that create or destroy entities
    /// while walking the list.
    pub fn alive_ids(&self, kind: Option<K>) -> Vec<EntityId> {
        self.alive(kind).map(|e| e.id).collect()
    }

    pub fn count(&self, kind: Option<K>) -> usize {
        self.alive(kind).count()
    }

    /// Visit every live entity mutably, in creation order.
    pub fn for_each_alive_mut(&mut self, mut f: impl FnMut(&mut Entity<K>)) {
        for i in 0..self.order.len() {
            let id = self.order[i];
            if let Some(e) = self.get_mut(id) {
                if e.is_active() {
                    f(e);
                }
            }
        }
    }

    /// Remove every flagged entity and recycle its slot. Returns how many
    /// were removed.
    pub fn sweep(&mut self) -> usize {
        let mut removed = 0;
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            if slot.entry.as_ref().is_some_and(|e| e.pending_destroy) {
                slot.entry = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_indices.push(index as u32);
                removed += 1;
            }
        }
        if removed > 0 {
            let slots = &self.slots;
            self.order.retain(|id| {
                let slot = &slots[id.index as usize];
                slot.generation == id.generation && slot.entry.is_some()
            });
            log::trace!("sweep removed {} entit(ies)", removed);
        }
        removed
    }

    /// Entities physically stored, including ones awaiting the sweep.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<K: Copy + Eq + Debug> Default for EntityStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Player,
        Enemy,
        Bullet,
    }

    #[test]
    fn create_returns_live_entity_of_kind() {
        let mut store = EntityStore::new();
        let id = store.create(Kind::Player);
        assert!(store.is_alive(id));
        assert_eq!(store.get(id).map(|e| e.kind()), Some(Kind::Player));
        assert!(store.components(id).is_some_and(|c| c.transform.is_none()));
    }

    #[test]
    fn destroyed_entity_leaves_iteration_immediately() {
        let mut store = EntityStore::new();
        let a = store.create(Kind::Enemy);
        let b = store.create(Kind::Enemy);
        assert!(store.destroy(a));
        assert!(!store.destroy(a));

        assert_eq!(store.alive_ids(Some(Kind::Enemy)), vec![b]);
        assert!(!store.is_alive(a));
        // Still physically stored and readable until the sweep.
        assert!(store.get(a).is_some());
        assert_eq!(store.len(), 2);

        assert_eq!(store.sweep(), 1);
        assert!(store.get(a).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stale_handle_does_not_resolve_to_reused_slot() {
        let mut store = EntityStore::new();
        let old = store.create(Kind::Bullet);
        store.destroy(old);
        store.sweep();

        let new = store.create(Kind::Enemy);
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(store.get(old).is_none());
        assert!(!store.destroy(old));
        assert!(store.is_alive(new));
    }

    #[test]
    fn iteration_follows_creation_order_across_reuse() {
        let mut store = EntityStore::new();
        let a = store.create(Kind::Enemy);
        let b = store.create(Kind::Bullet);
        let c = store.create(Kind::Enemy);
        store.destroy(a);
        store.sweep();
        let d = store.create(Kind::Player);

        assert_eq!(store.alive_ids(None), vec![b, c, d]);
        assert_eq!(store.alive_ids(Some(Kind::Enemy)), vec![c]);
        assert_eq!(store.count(Some(Kind::Player)), 1);
    }

    #[test]
    fn entities_created_mid_loop_are_live_immediately() {
        let mut store = EntityStore::new();
        let parent = store.create(Kind::Enemy);
        for id in store.alive_ids(Some(Kind::Enemy)) {
            store.destroy(id);
            store.create(Kind::Bullet);
            store.create(Kind::Bullet);
        }
        assert!(!store.is_alive(parent));
        assert_eq!(store.count(Some(Kind::Bullet)), 2);
        assert_eq!(store.count(None), 2);
    }

    #[test]
    fn transform_accessors_respect_presence() {
        let mut store = EntityStore::new();
        let id = store.create(Kind::Player);
        assert!(store.transform(id).is_none());
        if let Some(c) = store.components_mut(id) {
            c.transform = Some(Transform::at(Vec2::new(1.0, 2.0)));
        }
        if let Some(t) = store.transform_mut(id) {
            t.pos.x += 3.0;
        }
        assert_eq!(store.transform(id).map(|t| t.pos), Some(Vec2::new(4.0, 2.0)));
    }

    #[test]
    fn for_each_alive_mut_skips_flagged() {
        let mut store = EntityStore::new();
        let a = store.create(Kind::Enemy);
        let b = store.create(Kind::Enemy);
        for id in [a, b] {
            if let Some(c) = store.components_mut(id) {
                c.transform = Some(Transform::moving(Vec2::ZERO, Vec2::new(10.0, 0.0)));
            }
        }
        store.destroy(a);
        store.for_each_alive_mut(|e| {
            if let Some(t) = e.components.transform.as_mut() {
                t.integrate(1.0);
            }
        });
        assert_eq!(store.transform(a).map(|t| t.pos.x), Some(0.0));
        assert_eq!(store.transform(b).map(|t| t.pos.x), Some(10.0));
    }
}
