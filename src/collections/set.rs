// ============================================================================
// spark-observables - ObservableSet
// Unique membership with insertion-ordered iteration and change events
// ============================================================================

use std::borrow::Borrow;
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::rc::Rc;

use indexmap::IndexSet;

#[cfg(feature = "tracing")]
use crate::core::constants::TRACE_TARGET;
use crate::core::constants::SIZE;
use crate::core::error::{ContainerKind, Result};
use crate::core::guard::{IterationGuard, IterationToken};
use crate::events::{Event, NotifyPropertiesChanged, PropertiesChanged, SetChange};

// =============================================================================
// OBSERVABLE SET
// =============================================================================

struct SetInner<T> {
    items: RefCell<IndexSet<T>>,
    guard: IterationGuard,
    properties_changed: Event<PropertiesChanged>,
    set_changed: Event<SetChange<T>>,
}

/// An observable set.
///
/// Two events:
/// 1. `set_changed`: members were added and/or removed
/// 2. `properties_changed`: the `size` property changed
///
/// Iteration follows insertion order. Like the collection, this is a shared
/// handle: clones see the same members and subscribers.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use spark_observables::ObservableSet;
///
/// let tags: ObservableSet<String> = ObservableSet::new();
/// let changes = Rc::new(Cell::new(0));
///
/// let counter = changes.clone();
/// tags.set_changed().subscribe(move |_| counter.set(counter.get() + 1));
///
/// assert!(tags.add("important".to_string()));
/// assert!(!tags.add("important".to_string())); // already present, no event
/// assert!(tags.has("important"));
/// assert_eq!(tags.len(), 1);
/// assert_eq!(changes.get(), 1);
/// ```
pub struct ObservableSet<T> {
    inner: Rc<SetInner<T>>,
}

impl<T> ObservableSet<T> {
    /// Raised after members are added or removed.
    pub fn set_changed(&self) -> &Event<SetChange<T>> {
        &self.inner.set_changed
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current iteration generation. Advances once per structural mutation.
    pub fn generation(&self) -> u64 {
        self.inner.guard.generation()
    }

    /// Whether both handles point at the same set.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Bump the guard and announce the change. `change` only runs when
    /// someone is subscribed.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn commit(
        &self,
        operation: &'static str,
        added: usize,
        removed: usize,
        change: impl FnOnce() -> SetChange<T>,
    ) {
        self.inner.guard.bump();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: TRACE_TARGET,
            kind = "set",
            operation,
            added,
            removed,
            generation = self.inner.guard.generation(),
            "set changed"
        );

        self.inner.set_changed.raise_with(change);
        if added != removed {
            self.inner
                .properties_changed
                .raise(&PropertiesChanged::single(SIZE));
        }
    }
}

impl<T> ObservableSet<T>
where
    T: Eq + Hash + Clone,
{
    /// Create an empty set.
    pub fn new() -> Self {
        Self::from_index_set(IndexSet::new())
    }

    /// Create an empty set with room for `capacity` members.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_index_set(IndexSet::with_capacity(capacity))
    }

    fn from_index_set(items: IndexSet<T>) -> Self {
        Self {
            inner: Rc::new(SetInner {
                items: RefCell::new(items),
                guard: IterationGuard::new(ContainerKind::Set),
                properties_changed: Event::new(),
                set_changed: Event::new(),
            }),
        }
    }

    // =========================================================================
    // HAS
    // =========================================================================

    pub fn has<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.items.borrow().contains(item)
    }

    // =========================================================================
    // ADD / DELETE / CLEAR
    // =========================================================================

    /// Add `item`. Returns true if it was not already a member.
    pub fn add(&self, item: T) -> bool {
        let is_new = self.inner.items.borrow_mut().insert(item.clone());
        if is_new {
            self.commit("add", 1, 0, || SetChange {
                added_items: vec![item],
                removed_items: Vec::new(),
            });
        }
        is_new
    }

    /// Remove `item`. Returns true if it was a member.
    ///
    /// Remaining members keep their insertion order.
    pub fn delete<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.inner.items.borrow_mut().shift_take(item);
        match removed {
            Some(removed) => {
                self.commit("delete", 0, 1, || SetChange {
                    added_items: Vec::new(),
                    removed_items: vec![removed],
                });
                true
            }
            None => false,
        }
    }

    /// Remove every member.
    pub fn clear(&self) {
        let removed: Vec<T> = self.inner.items.borrow_mut().drain(..).collect();
        if !removed.is_empty() {
            self.commit("clear", 0, removed.len(), || SetChange {
                added_items: Vec::new(),
                removed_items: removed,
            });
        }
    }

    // =========================================================================
    // ITERATION
    // =========================================================================

    /// Lazily iterate the members in insertion order.
    ///
    /// Each step yields `Err` if the set changed since the iterator was
    /// created; after that the iterator is exhausted.
    pub fn iter(&self) -> SetIter<T> {
        SetIter {
            set: self.clone(),
            token: self.inner.guard.start_iteration(),
            position: 0,
            finished: false,
        }
    }

    /// Call `callback(item, set)` for every member.
    ///
    /// Fails as soon as the set changes underneath the scan.
    pub fn for_each<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(&T, &Self),
    {
        for item in self.iter() {
            callback(&item?, self);
        }
        Ok(())
    }

    /// Copy of every member, in insertion order.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.borrow().iter().cloned().collect()
    }
}

// =============================================================================
// ITERATOR
// =============================================================================

/// Iterator returned by [`ObservableSet::iter`].
pub struct SetIter<T> {
    set: ObservableSet<T>,
    token: IterationToken,
    position: usize,
    finished: bool,
}

impl<T: Clone> Iterator for SetIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Err(err) = self.set.inner.guard.check_iteration(self.token) {
            self.finished = true;
            return Some(Err(err));
        }

        let item = self.set.inner.items.borrow().get_index(self.position).cloned();
        match item {
            Some(item) => {
                self.position += 1;
                Some(Ok(item))
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

impl<T: Clone> FusedIterator for SetIter<T> {}

impl<T> IntoIterator for &ObservableSet<T>
where
    T: Eq + Hash + Clone,
{
    type Item = Result<T>;
    type IntoIter = SetIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// TRAIT IMPLS
// =============================================================================

impl<T> NotifyPropertiesChanged for ObservableSet<T> {
    fn properties_changed(&self) -> &Event<PropertiesChanged> {
        &self.inner.properties_changed
    }
}

impl<T> Clone for ObservableSet<T> {
    /// Another handle to the same set.
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for ObservableSet<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ObservableSet<T>
where
    T: Eq + Hash + Clone,
{
    /// Build a set from `iter` without raising events. Duplicates collapse.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_index_set(iter.into_iter().collect())
    }
}

impl<T> Extend<T> for ObservableSet<T>
where
    T: Eq + Hash + Clone,
{
    /// Add each item in turn, one notification per new member.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableSet")
            .field("items", &*self.inner.items.borrow())
            .field("generation", &self.inner.guard.generation())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
