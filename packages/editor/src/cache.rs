//! # Editor Cache
//!
//! Keeps editor state alive across unmount/remount so switching tabs does
//! not rebuild the underlying engine. The cache is plain owned state; the
//! shell that creates it decides its lifetime, and nothing here is global.
//!
//! ## Design
//!
//! - Entries own their state; `destroy` runs exactly once per entry
//! - `hydrate` calls its factory only when no entry exists for the id,
//!   so a remount with a known id reuses the live state
//! - Destroying an absent id is a no-op

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use flowdeck_common::EditorId;

/// State that can live in an [`EditorCache`].
pub trait CachedState {
    /// Release everything the entry holds. Called exactly once, when the
    /// entry is removed or displaced.
    fn destroy(&mut self);
}

/// Map from editor id to its cached state.
#[derive(Debug, Default)]
pub struct EditorCache<S: CachedState> {
    entries: HashMap<EditorId, S>,
}

impl<S: CachedState> EditorCache<S> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Store an entry. Reusing an id silently overwrites; the displaced
    /// entry is destroyed first.
    pub fn add(&mut self, id: EditorId, state: S) {
        if let Some(mut displaced) = self.entries.insert(id, state) {
            displaced.destroy();
        }
    }

    pub fn get(&self, id: &EditorId) -> Option<&S> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &EditorId) -> Option<&mut S> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &EditorId) -> bool {
        self.entries.contains_key(id)
    }

    /// Return the entry for `id`, building it with `factory` only if none
    /// exists. At most one factory invocation per id for the lifetime of
    /// the entry.
    pub fn hydrate<F, E>(&mut self, id: &EditorId, factory: F) -> Result<&mut S, E>
    where
        F: FnOnce() -> Result<S, E>,
    {
        match self.entries.entry(id.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(factory()?)),
        }
    }

    /// Mutate the entry in place. Returns false when the id is absent.
    pub fn update<F>(&mut self, id: &EditorId, f: F) -> bool
    where
        F: FnOnce(&mut S),
    {
        match self.entries.get_mut(id) {
            Some(state) => {
                f(state);
                true
            }
            None => false,
        }
    }

    /// Destroy and remove the entry. Absent ids are a no-op.
    pub fn destroy(&mut self, id: &EditorId) {
        if let Some(mut state) = self.entries.remove(id) {
            state.destroy();
        }
    }

    /// Destroy every entry. Used on shell shutdown.
    pub fn destroy_all(&mut self) {
        for (_, mut state) in self.entries.drain() {
            state.destroy();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
