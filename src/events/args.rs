// ============================================================================
// spark-observables - Event Arguments
// Change descriptors delivered to subscribers
// ============================================================================

// =============================================================================
// PROPERTIES CHANGED
// =============================================================================

/// Names of the derived properties that changed (`length`, `size`, or a
/// view-model's own property names).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesChanged {
    pub changed_properties: Vec<&'static str>,
}

impl PropertiesChanged {
    pub fn new(changed_properties: Vec<&'static str>) -> Self {
        Self { changed_properties }
    }

    /// A notification for a single property.
    pub fn single(name: &'static str) -> Self {
        Self {
            changed_properties: vec![name],
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.changed_properties.iter().any(|changed| *changed == name)
    }
}

// =============================================================================
// COLLECTION CHANGED
// =============================================================================

/// Positional add/remove descriptor for an ordered collection.
///
/// Reads like a splice: starting at `start_index`, `removed_items` were taken
/// out and `added_items` were put in their place. Appends, prepends, pops
/// and shifts are the degenerate cases with one side empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionChange<T> {
    pub start_index: usize,
    pub added_items: Vec<T>,
    pub removed_items: Vec<T>,
}

impl<T> CollectionChange<T> {
    /// Added items paired with the index each now occupies.
    pub fn added_entries(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.added_items
            .iter()
            .enumerate()
            .map(move |(offset, item)| (self.start_index + offset, item))
    }

    /// Removed items paired with the index each occupied before the change.
    pub fn removed_entries(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.removed_items
            .iter()
            .enumerate()
            .map(move |(offset, item)| (self.start_index + offset, item))
    }

    /// Length difference this change produced.
    pub fn length_delta(&self) -> isize {
        self.added_items.len() as isize - self.removed_items.len() as isize
    }
}

impl<T: Clone> CollectionChange<T> {
    /// Replay this change on a mirror of the collection's previous contents.
    pub fn apply_to(&self, target: &mut Vec<T>) {
        let start = self.start_index.min(target.len());
        let end = (start + self.removed_items.len()).min(target.len());
        target.splice(start..end, self.added_items.iter().cloned());
    }
}

// =============================================================================
// COLLECTION REORDERED
// =============================================================================

/// Which in-place operation produced a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReorderOperation {
    Sort,
    Reverse,
    CopyWithin,
    Fill,
}

/// One position whose value changed during a reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedItem<T> {
    pub current_index: usize,
    pub current_item: T,
}

/// Every position whose value changed, with the value it now holds.
///
/// Positions not listed kept their value. Length never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReorder<T> {
    pub operation: ReorderOperation,
    pub moved_items: Vec<MovedItem<T>>,
}

impl<T: Clone> CollectionReorder<T> {
    /// Replay this reorder on a mirror of the collection's previous contents.
    pub fn apply_to(&self, target: &mut [T]) {
        for moved in &self.moved_items {
            if let Some(slot) = target.get_mut(moved.current_index) {
                *slot = moved.current_item.clone();
            }
        }
    }
}

// =============================================================================
// SET / MAP CHANGED
// =============================================================================

/// Membership change of an observable set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetChange<T> {
    pub added_items: Vec<T>,
    pub removed_items: Vec<T>,
}

/// Entry change of an observable map.
///
/// Replacing a value shows up as the old entry removed and the new one added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapChange<K, V> {
    pub added_entries: Vec<(K, V)>,
    pub removed_entries: Vec<(K, V)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_change_replays_a_splice() {
        let mut mirror = vec![1, 2, 3];
        let change = CollectionChange {
            start_index: 1,
            added_items: vec![10, 20],
            removed_items: vec![2],
        };

        change.apply_to(&mut mirror);
        assert_eq!(mirror, vec![1, 10, 20, 3]);
        assert_eq!(change.length_delta(), 1);
        assert_eq!(
            change.added_entries().collect::<Vec<_>>(),
            vec![(1, &10), (2, &20)]
        );
        assert_eq!(change.removed_entries().collect::<Vec<_>>(), vec![(1, &2)]);
    }

    #[test]
    fn reorder_replays_moved_positions_only() {
        let mut mirror = vec!['a', 'b', 'c', 'd'];
        let reorder = CollectionReorder {
            operation: ReorderOperation::Reverse,
            moved_items: vec![
                MovedItem { current_index: 0, current_item: 'd' },
                MovedItem { current_index: 1, current_item: 'c' },
                MovedItem { current_index: 2, current_item: 'b' },
                MovedItem { current_index: 3, current_item: 'a' },
            ],
        };

        reorder.apply_to(&mut mirror);
        assert_eq!(mirror, vec!['d', 'c', 'b', 'a']);
    }

    #[test]
    fn properties_changed_lookup() {
        let args = PropertiesChanged::new(vec!["name", "age"]);
        assert!(args.contains("age"));
        assert!(!args.contains("length"));
        assert_eq!(PropertiesChanged::single("size").changed_properties, vec!["size"]);
    }
}
