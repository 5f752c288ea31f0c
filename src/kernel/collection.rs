//! Ordered collection with an active pointer.
//!
//! Shared by the document registry and the session multiplexer: items keep
//! insertion order, keys are unique, and `active` is either `None` (only when
//! empty) or the key of a present item.

pub trait Keyed {
    type Key: Clone + PartialEq + std::fmt::Debug;

    fn key(&self) -> &Self::Key;
}

#[derive(Debug, Clone)]
pub struct ActiveList<T: Keyed> {
    items: Vec<T>,
    active: Option<T::Key>,
}

impl<T: Keyed> Default for ActiveList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            active: None,
        }
    }
}

impl<T: Keyed> ActiveList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn active_key(&self) -> Option<&T::Key> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&T> {
        let key = self.active.as_ref()?;
        self.get(key)
    }

    pub fn active_mut(&mut self) -> Option<&mut T> {
        let key = self.active.clone()?;
        self.get_mut(&key)
    }

    pub fn position(&self, key: &T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == key)
    }

    /// Appends `item` and makes it active. Returns `false` (and drops `item`)
    /// if the key is already present.
    pub fn push_active(&mut self, item: T) -> bool {
        if self.contains(item.key()) {
            return false;
        }
        self.active = Some(item.key().clone());
        self.items.push(item);
        true
    }

    /// Removes the item. When it was active, the last remaining item becomes
    /// active.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let index = self.position(key)?;
        let removed = self.items.remove(index);
        if self.active.as_ref() == Some(key) {
            self.active = self.items.last().map(|item| item.key().clone());
        }
        Some(removed)
    }

    pub fn set_active(&mut self, key: &T::Key) -> bool {
        if !self.contains(key) || self.active.as_ref() == Some(key) {
            return false;
        }
        self.active = Some(key.clone());
        true
    }

    /// Swaps the item under `old` for `item`, keeping its position. Any other
    /// item already holding the new key is dropped first.
    pub fn replace(&mut self, old: &T::Key, item: T) -> bool {
        let new_key = item.key().clone();
        if &new_key != old {
            if let Some(dup) = self.position(&new_key) {
                self.items.remove(dup);
                if self.active.as_ref() == Some(&new_key) {
                    self.active = None;
                }
            }
        }

        let Some(index) = self.position(old) else {
            if self.active.is_none() {
                self.active = self.items.last().map(|item| item.key().clone());
            }
            return false;
        };

        let was_active = self.active.as_ref() == Some(old);
        self.items[index] = item;
        if was_active || self.active.is_none() {
            self.active = Some(new_key);
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/collection.rs"]
mod tests;
