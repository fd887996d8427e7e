// ============================================================================
// spark-observables - ObservableMap
// Unique keys with insertion-ordered iteration and change events
// ============================================================================

use std::borrow::Borrow;
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::rc::Rc;

use indexmap::IndexMap;

#[cfg(feature = "tracing")]
use crate::core::constants::TRACE_TARGET;
use crate::core::constants::SIZE;
use crate::core::error::{ContainerKind, Result};
use crate::core::guard::{IterationGuard, IterationToken};
use crate::events::{Event, MapChange, NotifyPropertiesChanged, PropertiesChanged};

// =============================================================================
// OBSERVABLE MAP
// =============================================================================

struct MapInner<K, V> {
    entries: RefCell<IndexMap<K, V>>,
    guard: IterationGuard,
    properties_changed: Event<PropertiesChanged>,
    map_changed: Event<MapChange<K, V>>,
}

/// An observable map.
///
/// Two events:
/// 1. `map_changed`: entries were added, replaced and/or removed
/// 2. `properties_changed`: the `size` property changed
///
/// Replacing a value with an equal one is a no-op. Iteration follows
/// insertion order.
///
/// # Example
///
/// ```
/// use spark_observables::ObservableMap;
///
/// let ages: ObservableMap<String, u32> = ObservableMap::new();
///
/// assert_eq!(ages.set("alice".to_string(), 25), None);
/// assert_eq!(ages.set("alice".to_string(), 26), Some(25));
/// assert_eq!(ages.get("alice"), Some(26));
/// assert_eq!(ages.len(), 1);
///
/// assert_eq!(ages.delete("alice"), Some(26));
/// assert!(ages.is_empty());
/// ```
pub struct ObservableMap<K, V> {
    inner: Rc<MapInner<K, V>>,
}

impl<K, V> ObservableMap<K, V> {
    /// Raised after entries are added, replaced or removed.
    pub fn map_changed(&self) -> &Event<MapChange<K, V>> {
        &self.inner.map_changed
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current iteration generation. Advances once per structural mutation.
    pub fn generation(&self) -> u64 {
        self.inner.guard.generation()
    }

    /// Whether both handles point at the same map.
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
        change: impl FnOnce() -> MapChange<K, V>,
    ) {
        self.inner.guard.bump();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: TRACE_TARGET,
            kind = "map",
            operation,
            added,
            removed,
            generation = self.inner.guard.generation(),
            "map changed"
        );

        self.inner.map_changed.raise_with(change);
        if added != removed {
            self.inner
                .properties_changed
                .raise(&PropertiesChanged::single(SIZE));
        }
    }
}

impl<K, V> ObservableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty map.
    pub fn new() -> Self {
        Self::from_index_map(IndexMap::new())
    }

    /// Create an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_index_map(IndexMap::with_capacity(capacity))
    }

    fn from_index_map(entries: IndexMap<K, V>) -> Self {
        Self {
            inner: Rc::new(MapInner {
                entries: RefCell::new(entries),
                guard: IterationGuard::new(ContainerKind::Map),
                properties_changed: Event::new(),
                map_changed: Event::new(),
            }),
        }
    }

    // =========================================================================
    // GET / HAS
    // =========================================================================

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.entries.borrow().get(key).cloned()
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.entries.borrow().contains_key(key)
    }

    // =========================================================================
    // SET / DELETE / CLEAR
    // =========================================================================

    /// Store `value` under `key`. Returns the previous value, if any.
    ///
    /// A new key announces `size`; replacing a value does not. Storing a
    /// value equal to the current one changes nothing.
    pub fn set(&self, key: K, value: V) -> Option<V>
    where
        V: PartialEq,
    {
        let previous = {
            let mut entries = self.inner.entries.borrow_mut();
            match entries.get_mut(&key) {
                Some(current) if *current == value => return Some(value),
                Some(current) => Some(std::mem::replace(current, value.clone())),
                None => {
                    entries.insert(key.clone(), value.clone());
                    None
                }
            }
        };

        self.commit("set", 1, usize::from(previous.is_some()), || {
            let removed_entries = previous
                .iter()
                .map(|old| (key.clone(), old.clone()))
                .collect();
            MapChange {
                added_entries: vec![(key, value)],
                removed_entries,
            }
        });
        previous
    }

    /// Remove `key`. Returns its value if it was present.
    ///
    /// Remaining entries keep their insertion order.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.inner.entries.borrow_mut().shift_remove_entry(key);
        let (key, value) = removed?;
        self.commit("delete", 0, 1, || MapChange {
            added_entries: Vec::new(),
            removed_entries: vec![(key, value.clone())],
        });
        Some(value)
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let removed: Vec<(K, V)> = self.inner.entries.borrow_mut().drain(..).collect();
        if !removed.is_empty() {
            self.commit("clear", 0, removed.len(), || MapChange {
                added_entries: Vec::new(),
                removed_entries: removed,
            });
        }
    }

    // =========================================================================
    // ITERATION
    // =========================================================================

    /// Lazily iterate `(key, value)` pairs in insertion order.
    ///
    /// Each step yields `Err` if the map changed since the iterator was
    /// created; after that the iterator is exhausted.
    pub fn iter(&self) -> MapIter<K, V> {
        MapIter {
            map: self.clone(),
            token: self.inner.guard.start_iteration(),
            position: 0,
            finished: false,
        }
    }

    /// Guarded iteration over keys.
    pub fn keys(&self) -> impl Iterator<Item = Result<K>> + use<K, V> {
        self.iter().map(|entry| entry.map(|(key, _)| key))
    }

    /// Guarded iteration over values.
    pub fn values(&self) -> impl Iterator<Item = Result<V>> + use<K, V> {
        self.iter().map(|entry| entry.map(|(_, value)| value))
    }

    /// Call `callback(value, key, map)` for every entry.
    ///
    /// Fails as soon as the map changes underneath the scan.
    pub fn for_each<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(&V, &K, &Self),
    {
        for entry in self.iter() {
            let (key, value) = entry?;
            callback(&value, &key, self);
        }
        Ok(())
    }

    /// Copy of every entry, in insertion order.
    pub fn to_vec(&self) -> Vec<(K, V)> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

// =============================================================================
// ITERATOR
// =============================================================================

/// Iterator returned by [`ObservableMap::iter`].
pub struct MapIter<K, V> {
    map: ObservableMap<K, V>,
    token: IterationToken,
    position: usize,
    finished: bool,
}

impl<K: Clone, V: Clone> Iterator for MapIter<K, V> {
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Err(err) = self.map.inner.guard.check_iteration(self.token) {
            self.finished = true;
            return Some(Err(err));
        }

        let entry = self
            .map
            .inner
            .entries
            .borrow()
            .get_index(self.position)
            .map(|(key, value)| (key.clone(), value.clone()));
        match entry {
            Some(entry) => {
                self.position += 1;
                Some(Ok(entry))
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

impl<K: Clone, V: Clone> FusedIterator for MapIter<K, V> {}

impl<K, V> IntoIterator for &ObservableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    type Item = Result<(K, V)>;
    type IntoIter = MapIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// TRAIT IMPLS
// =============================================================================

impl<K, V> NotifyPropertiesChanged for ObservableMap<K, V> {
    fn properties_changed(&self) -> &Event<PropertiesChanged> {
        &self.inner.properties_changed
    }
}

impl<K, V> Clone for ObservableMap<K, V> {
    /// Another handle to the same map.
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for ObservableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for ObservableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Build a map from `iter` without raising events. Later duplicates win.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_index_map(iter.into_iter().collect())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ObservableMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableMap")
            .field("entries", &*self.inner.entries.borrow())
            .field("generation", &self.inner.guard.generation())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::ObservableMap;
    use crate::core::error::{ContainerKind, ObservableError, Result};
    use crate::events::NotifyPropertiesChanged;

    fn record(map: &ObservableMap<&'static str, i32>) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        map.map_changed().subscribe(move |change| {
            sink.borrow_mut().push(format!(
                "+{:?} -{:?}",
                change.added_entries, change.removed_entries
            ));
        });
        let sink = log.clone();
        map.properties_changed().subscribe(move |args| {
            sink.borrow_mut()
                .push(format!("props {:?}", args.changed_properties));
        });
        log
    }

    #[test]
    fn new_key_announces_size() {
        let map = ObservableMap::new();
        let log = record(&map);

        assert_eq!(map.set("a", 1), None);
        assert_eq!(map.get("a"), Some(1));
        assert!(map.has("a"));
        assert_eq!(
            *log.borrow(),
            vec!["+[(\"a\", 1)] -[]", "props [\"size\"]"]
        );
    }

    #[test]
    fn replacing_value_keeps_size() {
        let map: ObservableMap<&'static str, i32> = [("a", 1)].into_iter().collect();
        let log = record(&map);

        assert_eq!(map.set("a", 2), Some(1));
        assert_eq!(*log.borrow(), vec!["+[(\"a\", 2)] -[(\"a\", 1)]"]);
    }

    #[test]
    fn storing_equal_value_is_a_no_op() {
        let map: ObservableMap<&'static str, i32> = [("a", 1)].into_iter().collect();
        let log = record(&map);

        assert_eq!(map.set("a", 1), Some(1));
        assert!(log.borrow().is_empty());
        assert_eq!(map.generation(), 0);
    }

    #[test]
    fn delete_and_clear() {
        let map: ObservableMap<&'static str, i32> =
            [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        let log = record(&map);

        assert_eq!(map.delete("z"), None);
        assert!(log.borrow().is_empty());

        assert_eq!(map.delete("b"), Some(2));
        assert_eq!(map.to_vec(), vec![("a", 1), ("c", 3)]);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(
            *log.borrow(),
            vec![
                "+[] -[(\"b\", 2)]",
                "props [\"size\"]",
                "+[] -[(\"a\", 1), (\"c\", 3)]",
                "props [\"size\"]",
            ]
        );
    }

    #[test]
    fn keys_and_values_follow_insertion_order() {
        let map: ObservableMap<&'static str, i32> = [("x", 1), ("y", 2)].into_iter().collect();

        let keys: Result<Vec<_>> = map.keys().collect();
        let values: Result<Vec<_>> = map.values().collect();
        assert_eq!(keys, Ok(vec!["x", "y"]));
        assert_eq!(values, Ok(vec![1, 2]));
    }

    #[test]
    fn for_each_passes_value_then_key() {
        let map: ObservableMap<&'static str, i32> = [("x", 1), ("y", 2)].into_iter().collect();
        let mut seen = Vec::new();

        map.for_each(|value, key, _| seen.push(format!("{key}={value}")))
            .unwrap();
        assert_eq!(seen, vec!["x=1", "y=2"]);
    }

    #[test]
    fn iterator_fails_after_mutation() {
        let map: ObservableMap<&'static str, i32> = [("x", 1), ("y", 2)].into_iter().collect();
        let mut iter = map.iter();

        assert_eq!(iter.next(), Some(Ok(("x", 1))));
        map.delete("y");
        assert_eq!(
            iter.next(),
            Some(Err(ObservableError::IterationInvalidated(ContainerKind::Map)))
        );
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn replacing_value_during_iteration_invalidates() {
        let map: ObservableMap<&'static str, i32> = [("x", 1), ("y", 2)].into_iter().collect();

        let result = map.for_each(|_, key, this| {
            if *key == "x" {
                this.set("y", 20);
            }
        });
        assert_eq!(
            result,
            Err(ObservableError::IterationInvalidated(ContainerKind::Map))
        );
        assert_eq!(map.get("y"), Some(20));
    }
}
