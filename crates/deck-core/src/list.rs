//! Flattening of tree-shaped panel data into a navigable list.
//!
//! Every panel builds its rows through a [`FlatListBuilder`]: parents are
//! pushed before their children, collapsed parents simply skip their
//! subtree, and group headers are registered as jump targets. The result is
//! a read-only [`FlatList`] owned by the panel that built it.

use std::collections::BTreeSet;

/// A row in a flattened panel list.
pub trait FlatItem {
    /// Identity that survives a rebuild, used to keep the cursor on the same
    /// logical row.
    type Key: Clone + PartialEq + std::fmt::Debug;

    fn key(&self) -> Self::Key;

    /// Derived from the row kind only.
    fn selectable(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatList<T> {
    items: Vec<T>,
    jumps: Vec<usize>,
}

impl<T> Default for FlatList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            jumps: Vec::new(),
        }
    }
}

impl<T> FlatList<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Indices of registered group headers, ascending.
    pub fn jumps(&self) -> &[usize] {
        &self.jumps
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }
}

impl<T: FlatItem> FlatList<T> {
    pub fn position(&self, key: &T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.key() == *key)
    }

    pub fn has_selectable(&self) -> bool {
        self.items.iter().any(FlatItem::selectable)
    }
}

#[derive(Debug)]
pub struct FlatListBuilder<T> {
    list: FlatList<T>,
}

impl<T> Default for FlatListBuilder<T> {
    fn default() -> Self {
        Self {
            list: FlatList::default(),
        }
    }
}

impl<T> FlatListBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) -> usize {
        self.list.items.push(item);
        self.list.items.len() - 1
    }

    /// Pushes a group header and records it as a jump target.
    pub fn push_group(&mut self, item: T) -> usize {
        let index = self.push(item);
        self.list.jumps.push(index);
        index
    }

    pub fn len(&self) -> usize {
        self.list.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.items.is_empty()
    }

    pub fn finish(self) -> FlatList<T> {
        self.list
    }
}

/// Collapse state keyed by a typed, position-independent identity.
///
/// Keys can be collapsed by default: a default applies only the first time
/// the key is seen, after that the user's choice sticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseSet<K: Ord> {
    collapsed: BTreeSet<K>,
    seen: BTreeSet<K>,
}

impl<K: Ord> Default for CollapseSet<K> {
    fn default() -> Self {
        Self {
            collapsed: BTreeSet::new(),
            seen: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone> CollapseSet<K> {
    pub fn is_collapsed(&self, key: &K) -> bool {
        self.collapsed.contains(key)
    }

    pub fn toggle(&mut self, key: K) -> bool {
        self.seen.insert(key.clone());
        if self.collapsed.remove(&key) {
            false
        } else {
            self.collapsed.insert(key);
            true
        }
    }

    pub fn set(&mut self, key: K, collapsed: bool) {
        self.seen.insert(key.clone());
        if collapsed {
            self.collapsed.insert(key);
        } else {
            self.collapsed.remove(&key);
        }
    }

    /// Collapses `key` unless it has been seen before.
    pub fn default_collapsed(&mut self, key: K) {
        if self.seen.insert(key.clone()) {
            self.collapsed.insert(key);
        }
    }

    /// Drops state for keys whose node no longer exists.
    pub fn retain(&mut self, mut alive: impl FnMut(&K) -> bool) {
        self.collapsed.retain(|key| alive(key));
        self.seen.retain(|key| alive(key));
    }

    pub fn clear(&mut self) {
        self.collapsed.clear();
        self.seen.clear();
    }
}
