//! Explicitly owned collection of live bodies
//!
//! The registry keeps bodies in insertion order in one contiguous `Vec` so
//! the integrator can borrow them as a slice. Handles are monotonic and
//! never reused. Visual data is stored in a parallel vector keyed by the
//! same position, so physics code never sees it.
//!
//! Every structural change bumps `version()`; observers poll it instead of
//! subscribing to callbacks.

use crate::simulation::states::{Body, BodyId, RestState};

/// Non-physics data attached to a body (name, mesh reference)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visual {
    pub name: String,
    pub mesh_id: Option<i64>,
}

impl Visual {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh_id: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct BodyRegistry {
    ids: Vec<BodyId>,
    bodies: Vec<Body>,
    visuals: Vec<Visual>,
    next_id: u64,
    version: u64,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body and return its handle
    pub fn add(&mut self, body: Body, visual: Visual) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.ids.push(id);
        self.bodies.push(body);
        self.visuals.push(visual);
        self.version += 1;
        id
    }

    /// Remove a body, keeping the order of the others
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.index_of(id)?;
        self.ids.remove(idx);
        self.visuals.remove(idx);
        self.version += 1;
        Some(self.bodies.remove(idx))
    }

    /// Drop every body
    pub fn clear(&mut self) {
        if self.ids.is_empty() {
            return;
        }
        self.ids.clear();
        self.bodies.clear();
        self.visuals.clear();
        self.version += 1;
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Incremented on every add, remove and clear
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(move |i| &mut self.bodies[i])
    }

    pub fn visual(&self, id: BodyId) -> Option<&Visual> {
        self.index_of(id).map(|i| &self.visuals[i])
    }

    pub fn ids(&self) -> &[BodyId] {
        &self.ids
    }

    /// Bodies in registry order
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Mutable bodies in registry order, for the integrator
    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Iterate `(id, body, visual)` in registry order
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body, &Visual)> {
        self.ids
            .iter()
            .copied()
            .zip(self.bodies.iter())
            .zip(self.visuals.iter())
            .map(|((id, b), vis)| (id, b, vis))
    }

    /// Snapshot of every body's current position/velocity
    pub fn rest_states(&self) -> Vec<(BodyId, RestState)> {
        self.iter().map(|(id, b, _)| (id, b.rest_state())).collect()
    }

    /// Restore bodies from `rest`; bodies without an entry are left alone.
    /// Returns how many bodies were restored
    pub fn reset(&mut self, rest: &[(BodyId, RestState)]) -> usize {
        let mut restored = 0;
        for (id, state) in rest {
            if let Some(body) = self.get_mut(*id) {
                body.restore(state);
                restored += 1;
            }
        }
        restored
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        // ids are pushed in increasing order and removals keep order
        self.ids.binary_search(&id).ok()
    }
}
