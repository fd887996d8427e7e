// ============================================================================
// spark-observables - ObservableCollection
// An ordered sequence that announces every structural change
// ============================================================================
//
// The collection is a shared handle: clones see the same items, the same
// subscribers and the same iteration guard. Items live in a RefCell that is
// only borrowed for the duration of a single read or write, never across a
// call into user code, so handlers and scan callbacks may re-enter freely.
//
// Every add/remove style mutation funnels through `splice_range`, which
// applies the edit, bumps the guard, then raises `collection_changed`
// followed by `properties_changed` for `length` when the length moved.
// ============================================================================

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;

#[cfg(feature = "tracing")]
use crate::core::constants::TRACE_TARGET;
use crate::core::constants::{DEFAULT_SEPARATOR, LENGTH};
use crate::core::error::{ContainerKind, ObservableError, Result};
use crate::core::guard::{IterationGuard, IterationToken};
use crate::core::index::{clamp_relative, last_search_start, resolve_end, resolve_start, wrap_index};
use crate::events::{
    CollectionChange, CollectionReorder, Event, NotifyPropertiesChanged, PropertiesChanged,
};

use super::join::{JoinItem, join_items};

// =============================================================================
// OBSERVABLE COLLECTION
// =============================================================================

pub(super) struct CollectionInner<T> {
    pub(super) items: RefCell<Vec<T>>,
    pub(super) guard: IterationGuard,
    pub(super) properties_changed: Event<PropertiesChanged>,
    pub(super) collection_changed: Event<CollectionChange<T>>,
    pub(super) collection_reordered: Event<CollectionReorder<T>>,
}

/// An observable ordered collection.
///
/// Three events:
/// 1. `collection_changed`: items were added and/or removed at a position
/// 2. `collection_reordered`: items changed place without the length moving
///    (`sort`, `reverse`, `fill`, `copy_within`)
/// 3. `properties_changed`: the `length` property changed
///
/// Mutations that would not change anything raise nothing and leave live
/// iterators valid.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use spark_observables::ObservableCollection;
///
/// let numbers = ObservableCollection::from_vec(vec![1, 2, 3]);
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let sink = seen.clone();
/// numbers.collection_changed().subscribe(move |change| {
///     sink.borrow_mut().push((change.start_index, change.added_items.clone()));
/// });
///
/// let removed = numbers.splice(1, Some(1), [10, 20]);
/// assert_eq!(removed, vec![2]);
/// assert_eq!(numbers.to_vec(), vec![1, 10, 20, 3]);
/// assert_eq!(*seen.borrow(), vec![(1, vec![10, 20])]);
/// ```
pub struct ObservableCollection<T> {
    pub(super) inner: Rc<CollectionInner<T>>,
}

impl<T> ObservableCollection<T> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create an empty collection with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity))
    }

    /// Create a collection holding `items`. No events are raised.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(CollectionInner {
                items: RefCell::new(items),
                guard: IterationGuard::new(ContainerKind::Collection),
                properties_changed: Event::new(),
                collection_changed: Event::new(),
                collection_reordered: Event::new(),
            }),
        }
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Raised after items are added or removed.
    pub fn collection_changed(&self) -> &Event<CollectionChange<T>> {
        &self.inner.collection_changed
    }

    /// Raised after an in-place reorder.
    pub fn collection_reordered(&self) -> &Event<CollectionReorder<T>> {
        &self.inner.collection_reordered
    }

    // =========================================================================
    // LENGTH
    // =========================================================================

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

    /// Whether both handles point at the same collection.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrow the items for the duration of `f` without cloning.
    ///
    /// # Panics
    ///
    /// Panics if `f` mutates this collection.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let items = self.inner.items.borrow();
        f(items.as_slice())
    }

    fn raise_length_changed(&self) {
        self.inner
            .properties_changed
            .raise(&PropertiesChanged::single(LENGTH));
    }
}

// =============================================================================
// READ OPERATIONS
// =============================================================================

impl<T: Clone> ObservableCollection<T> {
    pub(super) fn item_at(&self, index: usize) -> Option<T> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Item at `index`; negative values count from the end.
    ///
    /// Fails with [`ObservableError::IndexOutOfRange`] when the normalised
    /// index falls outside `[0, len)`.
    pub fn get(&self, index: isize) -> Result<T> {
        let items = self.inner.items.borrow();
        wrap_index(index, items.len())
            .and_then(|position| items.get(position))
            .cloned()
            .ok_or(ObservableError::IndexOutOfRange {
                index,
                length: items.len(),
            })
    }

    /// Item at `index`, or `None` when out of range. Negative values count from the end.
    pub fn at(&self, index: isize) -> Option<T> {
        let items = self.inner.items.borrow();
        wrap_index(index, items.len()).and_then(|position| items.get(position).cloned())
    }

    pub fn first(&self) -> Option<T> {
        self.inner.items.borrow().first().cloned()
    }

    pub fn last(&self) -> Option<T> {
        self.inner.items.borrow().last().cloned()
    }

    /// Copy of every item, in order.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }

    /// Copy of `[start, end)` after normalising both bounds.
    pub fn slice(&self, start: Option<isize>, end: Option<isize>) -> Vec<T> {
        let items = self.inner.items.borrow();
        let start = resolve_start(start, items.len());
        let end = resolve_end(end, items.len());
        if start >= end {
            return Vec::new();
        }
        items[start..end].to_vec()
    }

    /// Reversed copy. The collection is untouched.
    pub fn to_reversed(&self) -> Vec<T> {
        let mut items = self.to_vec();
        items.reverse();
        items
    }

    /// Sorted copy (stable). The collection is untouched.
    pub fn to_sorted_by<F>(&self, compare: F) -> Vec<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        // Sort outside the borrow: the comparator may read the collection
        let mut items = self.to_vec();
        items.sort_by(compare);
        items
    }

    pub fn to_sorted(&self) -> Vec<T>
    where
        T: Ord,
    {
        self.to_sorted_by(Ord::cmp)
    }

    // =========================================================================
    // ITERATION
    // =========================================================================

    /// Lazily iterate the items.
    ///
    /// Each step yields `Err` if the collection changed structurally since
    /// the iterator was created; after that the iterator is exhausted.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            entries: Entries::new(self.clone()),
        }
    }

    fn entries(&self) -> Entries<T> {
        Entries::new(self.clone())
    }

    /// Call `callback(item, index, collection)` for every item.
    ///
    /// Fails as soon as the collection changes underneath the scan,
    /// including changes made by `callback` itself.
    pub fn for_each<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(&T, usize, &Self),
    {
        for entry in self.entries() {
            let (index, item) = entry?;
            callback(&item, index, self);
        }
        Ok(())
    }

    /// Whether any item satisfies `predicate`. Stops at the first match.
    pub fn some<F>(&self, mut predicate: F) -> Result<bool>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        for entry in self.entries() {
            let (index, item) = entry?;
            if predicate(&item, index, self) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether every item satisfies `predicate`. Stops at the first miss.
    pub fn every<F>(&self, mut predicate: F) -> Result<bool>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        for entry in self.entries() {
            let (index, item) = entry?;
            if !predicate(&item, index, self) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn find<F>(&self, predicate: F) -> Result<Option<T>>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        Ok(self.find_entry(false, predicate)?.map(|(_, item)| item))
    }

    pub fn find_index<F>(&self, predicate: F) -> Result<Option<usize>>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        Ok(self.find_entry(false, predicate)?.map(|(index, _)| index))
    }

    /// Like [`find`](Self::find), scanning from the back.
    pub fn find_last<F>(&self, predicate: F) -> Result<Option<T>>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        Ok(self.find_entry(true, predicate)?.map(|(_, item)| item))
    }

    pub fn find_last_index<F>(&self, predicate: F) -> Result<Option<usize>>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        Ok(self.find_entry(true, predicate)?.map(|(index, _)| index))
    }

    fn find_entry<F>(&self, from_back: bool, mut predicate: F) -> Result<Option<(usize, T)>>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        let mut entries = self.entries();
        loop {
            let next = if from_back {
                entries.next_back()
            } else {
                entries.next()
            };
            let Some(entry) = next else {
                return Ok(None);
            };
            let (index, item) = entry?;
            if predicate(&item, index, self) {
                return Ok(Some((index, item)));
            }
        }
    }

    /// Items satisfying `predicate`, in order.
    pub fn filter<F>(&self, mut predicate: F) -> Result<Vec<T>>
    where
        F: FnMut(&T, usize, &Self) -> bool,
    {
        let mut kept = Vec::new();
        for entry in self.entries() {
            let (index, item) = entry?;
            if predicate(&item, index, self) {
                kept.push(item);
            }
        }
        Ok(kept)
    }

    pub fn map<U, F>(&self, mut transform: F) -> Result<Vec<U>>
    where
        F: FnMut(&T, usize, &Self) -> U,
    {
        let mut mapped = Vec::with_capacity(self.len());
        for entry in self.entries() {
            let (index, item) = entry?;
            mapped.push(transform(&item, index, self));
        }
        Ok(mapped)
    }

    /// Fold the items front to back starting from `initial`.
    pub fn reduce<U, F>(&self, initial: U, mut reducer: F) -> Result<U>
    where
        F: FnMut(U, &T, usize, &Self) -> U,
    {
        let mut accumulator = initial;
        for entry in self.entries() {
            let (index, item) = entry?;
            accumulator = reducer(accumulator, &item, index, self);
        }
        Ok(accumulator)
    }
}

impl<T: PartialEq> ObservableCollection<T> {
    /// First position of `item` at or after `from` (default 0).
    pub fn index_of(&self, item: &T, from: Option<isize>) -> Option<usize> {
        self.with_items(|items| {
            let start = resolve_start(from, items.len());
            items[start..]
                .iter()
                .position(|candidate| candidate == item)
                .map(|offset| start + offset)
        })
    }

    /// Last position of `item` at or before `from` (default: last item).
    pub fn last_index_of(&self, item: &T, from: Option<isize>) -> Option<usize> {
        self.with_items(|items| {
            let start = last_search_start(from, items.len())?;
            items[..=start].iter().rposition(|candidate| candidate == item)
        })
    }

    pub fn includes(&self, item: &T) -> bool {
        self.with_items(|items| items.contains(item))
    }
}

impl<T: JoinItem> ObservableCollection<T> {
    /// Render every item and join them with `separator` (default `","`).
    pub fn join(&self, separator: Option<&str>) -> String {
        let separator = separator.unwrap_or(DEFAULT_SEPARATOR);
        self.with_items(|items| join_items(items, separator))
    }
}

// =============================================================================
// ADD / REMOVE OPERATIONS
// =============================================================================

impl<T: Clone> ObservableCollection<T> {
    /// Replace `delete_count` items at `start` with `added`, then notify.
    ///
    /// Bounds must already be normalised. Does nothing when nothing would
    /// be removed or added.
    fn splice_range(
        &self,
        operation: &'static str,
        start: usize,
        delete_count: usize,
        added: Vec<T>,
    ) -> Vec<T> {
        let old_len = self.len();
        let start = start.min(old_len);
        let end = start.saturating_add(delete_count).min(old_len);
        if start == end && added.is_empty() {
            return Vec::new();
        }

        let added_len = added.len();
        let (removed, new_len) = {
            let mut items = self.inner.items.borrow_mut();
            let removed: Vec<T> = items.splice(start..end, added).collect();
            (removed, items.len())
        };

        self.commit_change(operation, start, added_len, &removed, old_len, new_len);
        removed
    }

    /// Bump the guard and announce a splice of `added` items at `start`
    /// that took out `removed`. The items are only copied into the event
    /// when someone is subscribed.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn commit_change(
        &self,
        operation: &'static str,
        start: usize,
        added: usize,
        removed: &[T],
        old_len: usize,
        new_len: usize,
    ) {
        self.inner.guard.bump();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: TRACE_TARGET,
            kind = "collection",
            operation,
            start_index = start,
            added,
            removed = removed.len(),
            generation = self.inner.guard.generation(),
            "collection changed"
        );

        self.inner.collection_changed.raise_with(|| CollectionChange {
            start_index: start,
            added_items: self.with_items(|items| items[start..start + added].to_vec()),
            removed_items: removed.to_vec(),
        });
        if old_len != new_len {
            self.raise_length_changed();
        }
    }

    /// Append `items`. Returns the new length.
    pub fn push<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let added: Vec<T> = items.into_iter().collect();
        self.splice_range("push", self.len(), 0, added);
        self.len()
    }

    /// Remove and return the last item.
    pub fn pop(&self) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.splice_range("pop", len - 1, 1, Vec::new()).pop()
    }

    /// Prepend `items`, keeping their order. Returns the new length.
    pub fn unshift<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let added: Vec<T> = items.into_iter().collect();
        self.splice_range("unshift", 0, 0, added);
        self.len()
    }

    /// Remove and return the first item.
    pub fn shift(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.splice_range("shift", 0, 1, Vec::new()).into_iter().next()
    }

    /// Remove `delete_count` items from `start` and insert `items` there.
    ///
    /// `start` counts from the end when negative and is clamped to
    /// `[0, len]`. A missing `delete_count` removes everything from `start`;
    /// negative counts remove nothing. Returns the removed items.
    pub fn splice<I>(&self, start: isize, delete_count: Option<isize>, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let len = self.len();
        let start = clamp_relative(start, len);
        let available = len - start;
        let delete_count = match delete_count {
            None => available,
            Some(count) if count <= 0 => 0,
            Some(count) => count.unsigned_abs().min(available),
        };
        let added: Vec<T> = items.into_iter().collect();
        self.splice_range("splice", start, delete_count, added)
    }

    /// Remove every item.
    pub fn clear(&self) {
        self.splice_range("clear", 0, self.len(), Vec::new());
    }

    /// Replace the entire contents with `items` in a single notification.
    ///
    /// `length` is only announced when it actually differs.
    pub fn reset<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let added: Vec<T> = items.into_iter().collect();
        self.splice_range("reset", 0, self.len(), added);
    }
}

impl<T: Clone + Default> ObservableCollection<T> {
    /// `count` default items with room for one more, or `None` when growing
    /// the collection by that much cannot be allocated.
    fn padding(&self, count: usize) -> Option<Vec<T>> {
        let needed = count.checked_add(1)?;
        let mut added = Vec::new();
        added.try_reserve_exact(needed).ok()?;
        self.inner.items.borrow_mut().try_reserve(needed).ok()?;
        added.resize_with(count, T::default);
        Some(added)
    }

    /// Store `item` at `index`; negative values count from the end.
    ///
    /// Writing past the end grows the collection, padding the gap with
    /// `T::default()`. Fails when a negative index reaches past the front
    /// or the gap cannot be allocated.
    pub fn set(&self, index: isize, item: T) -> Result<()> {
        let len = self.len();
        let out_of_range = || ObservableError::IndexOutOfRange { index, length: len };
        let position = wrap_index(index, len).ok_or_else(out_of_range)?;

        if position < len {
            self.splice_range("set", position, 1, vec![item]);
        } else {
            let mut added = self.padding(position - len).ok_or_else(out_of_range)?;
            added.push(item);
            self.splice_range("set", len, 0, added);
        }
        Ok(())
    }

    /// Truncate to, or pad with `T::default()` up to, `new_len` items.
    ///
    /// Fails with [`ObservableError::InvalidLength`] when the padding cannot
    /// be allocated, leaving the collection untouched.
    pub fn set_length(&self, new_len: usize) -> Result<()> {
        let len = self.len();
        match new_len.cmp(&len) {
            Ordering::Less => {
                self.splice_range("length", new_len, len - new_len, Vec::new());
            }
            Ordering::Greater => {
                let added = self
                    .padding(new_len - len)
                    .ok_or(ObservableError::InvalidLength { length: new_len })?;
                self.splice_range("length", len, 0, added);
            }
            Ordering::Equal => {}
        }
        Ok(())
    }
}

// =============================================================================
// ITERATORS
// =============================================================================

/// Guarded cursor over `(index, item)` pairs, usable from both ends.
struct Entries<T> {
    collection: ObservableCollection<T>,
    token: IterationToken,
    front: usize,
    back: usize,
    finished: bool,
}

impl<T> Entries<T> {
    fn new(collection: ObservableCollection<T>) -> Self {
        let token = collection.inner.guard.start_iteration();
        let back = collection.len();
        Self {
            collection,
            token,
            front: 0,
            back,
            finished: false,
        }
    }
}

impl<T: Clone> Entries<T> {
    fn advance(&mut self, from_back: bool) -> Option<Result<(usize, T)>> {
        if self.finished {
            return None;
        }
        if let Err(err) = self.collection.inner.guard.check_iteration(self.token) {
            self.finished = true;
            return Some(Err(err));
        }
        if self.front >= self.back {
            self.finished = true;
            return None;
        }

        let index = if from_back {
            self.back -= 1;
            self.back
        } else {
            self.front += 1;
            self.front - 1
        };

        // Unchanged generation means unchanged length, so the slot exists
        match self.collection.item_at(index) {
            Some(item) => Some(Ok((index, item))),
            None => {
                self.finished = true;
                None
            }
        }
    }
}

impl<T: Clone> Iterator for Entries<T> {
    type Item = Result<(usize, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance(false)
    }
}

impl<T: Clone> DoubleEndedIterator for Entries<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.advance(true)
    }
}

/// Iterator returned by [`ObservableCollection::iter`].
pub struct Iter<T> {
    entries: Entries<T>,
}

impl<T: Clone> Iterator for Iter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|entry| entry.map(|(_, item)| item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.entries.finished {
            (0, Some(0))
        } else {
            // One extra slot for a possible invalidation error
            let remaining = self.entries.back - self.entries.front;
            (0, Some(remaining + 1))
        }
    }
}

impl<T: Clone> DoubleEndedIterator for Iter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(|entry| entry.map(|(_, item)| item))
    }
}

impl<T: Clone> FusedIterator for Iter<T> {}

impl<T: Clone> IntoIterator for &ObservableCollection<T> {
    type Item = Result<T>;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// TRAIT IMPLS
// =============================================================================

impl<T> NotifyPropertiesChanged for ObservableCollection<T> {
    fn properties_changed(&self) -> &Event<PropertiesChanged> {
        &self.inner.properties_changed
    }
}

impl<T> Clone for ObservableCollection<T> {
    /// Another handle to the same collection.
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for ObservableCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for ObservableCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T> FromIterator<T> for ObservableCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone> Extend<T> for ObservableCollection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.push(iter);
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCollection")
            .field("items", &*self.inner.items.borrow())
            .field("generation", &self.inner.guard.generation())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
