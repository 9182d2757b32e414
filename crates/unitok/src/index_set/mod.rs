//! # Index Sets
//!
//! Insertion-ordered, uniqueness-enforcing registries keyed by a derived
//! identity: vocabulary name, tokenizer id, or feature name.
//!
//! * [`IndexSet::add`] accepts an object whose key is free, is a no-op for the
//!   same object, and rejects a distinct object under a taken key.
//! * `merge` (per registry) is the lenient fold used across dataset
//!   boundaries; it is split into a fallible `plan_merge` and an infallible
//!   [`IndexSet::absorb`] so a failed union leaves nothing half-merged.

use crate::{errors::UnitokError, types::UTHashMap};

mod feature_set;
mod tokenizer_set;
mod vocabulary_set;

#[doc(inline)]
pub use feature_set::FeatureSet;
#[doc(inline)]
pub use tokenizer_set::TokenizerSet;
#[doc(inline)]
pub use vocabulary_set::VocabularySet;

/// An object stored in an [`IndexSet`].
pub trait Indexed {
    /// Registry name, for error messages.
    const REGISTRY: &'static str;

    /// The derived identity key.
    fn index_key(&self) -> &str;

    /// Is `other` the same object (not merely the same key)?
    fn is_same(
        &self,
        other: &Self,
    ) -> bool;

    /// The error for a distinct object colliding on `key`.
    fn conflict(key: &str) -> UnitokError {
        UnitokError::KeyConflict {
            registry: Self::REGISTRY,
            key: key.to_string(),
        }
    }
}

/// Insertion-ordered set of [`Indexed`] objects with unique keys.
#[derive(Debug, Clone)]
pub struct IndexSet<T: Indexed> {
    items: Vec<T>,
    index: UTHashMap<String, usize>,
}

impl<T: Indexed> Default for IndexSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: UTHashMap::default(),
        }
    }
}

impl<T: Indexed> IndexSet<T> {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Is `key` taken?
    pub fn has(
        &self,
        key: &str,
    ) -> bool {
        self.index.contains_key(key)
    }

    /// The object under `key`.
    pub fn get(
        &self,
        key: &str,
    ) -> Option<&T> {
        self.index.get(key).map(|&idx| &self.items[idx])
    }

    /// The object under `key`, mutably.
    pub fn get_mut(
        &mut self,
        key: &str,
    ) -> Option<&mut T> {
        self.index.get(key).map(|&idx| &mut self.items[idx])
    }

    /// Objects in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Objects in insertion order, mutably; keys must not change.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(Indexed::index_key)
    }

    /// Check whether `obj` could be added.
    ///
    /// ## Returns
    /// `Ok(true)` if the key is free, `Ok(false)` if `obj` is already present.
    pub fn check_add(
        &self,
        obj: &T,
    ) -> Result<bool, UnitokError> {
        match self.get(obj.index_key()) {
            None => Ok(true),
            Some(current) if current.is_same(obj) => Ok(false),
            Some(_) => Err(T::conflict(obj.index_key())),
        }
    }

    /// Add `obj`; a no-op if already present.
    ///
    /// ## Returns
    /// `true` if inserted.
    pub fn add(
        &mut self,
        obj: T,
    ) -> Result<bool, UnitokError> {
        if !self.check_add(&obj)? {
            return Ok(false);
        }
        self.insert(obj);
        Ok(true)
    }

    /// Add every object, failing before any insert if one collides.
    pub fn update<I>(
        &mut self,
        objs: I,
    ) -> Result<(), UnitokError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut staged: Vec<T> = Vec::new();
        for obj in objs {
            if !self.check_add(&obj)? {
                continue;
            }
            if let Some(prior) = staged.iter().find(|s| s.index_key() == obj.index_key()) {
                if prior.is_same(&obj) {
                    continue;
                }
                return Err(T::conflict(obj.index_key()));
            }
            staged.push(obj);
        }
        self.absorb(staged);
        Ok(())
    }

    /// Insert pre-validated objects.
    ///
    /// Keys are expected to be free; a taken key is overwritten.
    pub fn absorb<I>(
        &mut self,
        objs: I,
    ) where
        I: IntoIterator<Item = T>,
    {
        for obj in objs {
            match self.index.get(obj.index_key()) {
                Some(&idx) => self.items[idx] = obj,
                None => self.insert(obj),
            }
        }
    }

    /// Remove and return the object under `key`.
    pub fn remove(
        &mut self,
        key: &str,
    ) -> Option<T> {
        let idx = self.index.remove(key)?;
        let obj = self.items.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(obj)
    }

    fn insert(
        &mut self,
        obj: T,
    ) {
        self.index.insert(obj.index_key().to_string(), self.items.len());
        self.items.push(obj);
    }
}

impl<'a, T: Indexed> IntoIterator for &'a IndexSet<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Indexed> FromIterator<T> for IndexSet<T> {
    /// Later objects overwrite earlier ones with the same key.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.absorb(iter);
        set
    }
}
