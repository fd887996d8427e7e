// ============================================================================
// spark-observables - Reorder Operations
// In-place rewrites that keep the length: sort, reverse, fill, copy_within
// ============================================================================
//
// Each operation computes the new values for a span, then `rewrite_span`
// compares them position by position with what is stored. Only positions
// whose value actually changed are written and reported. If none changed,
// the call is a no-op: no event, no generation bump.
// ============================================================================

use std::cmp::Ordering;

#[cfg(feature = "tracing")]
use crate::core::constants::TRACE_TARGET;
use crate::core::error::Result;
use crate::core::index::{clamp_relative, resolve_end, resolve_start};
use crate::events::{CollectionReorder, MovedItem, ReorderOperation};

use super::collection::ObservableCollection;

impl<T: Clone + PartialEq> ObservableCollection<T> {
    /// Write `values` over the span starting at `start` and report the
    /// positions that changed. Returns whether anything changed.
    fn rewrite_span(&self, operation: ReorderOperation, start: usize, values: Vec<T>) -> bool {
        let moved: Vec<usize> = {
            let mut items = self.inner.items.borrow_mut();
            let mut moved = Vec::new();
            for (offset, value) in values.into_iter().enumerate() {
                let index = start + offset;
                let Some(slot) = items.get_mut(index) else {
                    break;
                };
                if *slot != value {
                    *slot = value;
                    moved.push(index);
                }
            }
            moved
        };

        if moved.is_empty() {
            return false;
        }

        self.inner.guard.bump();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: TRACE_TARGET,
            kind = "collection",
            operation = ?operation,
            moved = moved.len(),
            generation = self.inner.guard.generation(),
            "collection reordered"
        );

        self.inner.collection_reordered.raise_with(|| CollectionReorder {
            operation,
            moved_items: self.with_items(|items| {
                moved
                    .iter()
                    .map(|&index| MovedItem {
                        current_index: index,
                        current_item: items[index].clone(),
                    })
                    .collect()
            }),
        });
        true
    }

    /// Stable in-place sort by `compare`.
    ///
    /// The comparator runs against a snapshot. Fails with
    /// [`IterationInvalidated`](crate::ObservableError::IterationInvalidated)
    /// if the comparator mutates the collection; nothing is written then.
    pub fn sort_by<F>(&self, compare: F) -> Result<&Self>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let token = self.inner.guard.start_iteration();
        let mut sorted = self.to_vec();
        sorted.sort_by(compare);
        self.inner.guard.check_iteration(token)?;

        self.rewrite_span(ReorderOperation::Sort, 0, sorted);
        Ok(self)
    }

    /// Stable in-place sort by `Ord`.
    pub fn sort(&self) -> Result<&Self>
    where
        T: Ord,
    {
        self.sort_by(Ord::cmp)
    }

    /// Reverse the items in place.
    pub fn reverse(&self) -> &Self {
        let reversed = self.to_reversed();
        self.rewrite_span(ReorderOperation::Reverse, 0, reversed);
        self
    }

    /// Overwrite `[start, end)` with `value`.
    ///
    /// Bounds follow native rules; an empty effective range changes nothing.
    pub fn fill(&self, value: T, start: Option<isize>, end: Option<isize>) -> &Self {
        let len = self.len();
        let start = resolve_start(start, len);
        let end = resolve_end(end, len);
        if start < end {
            self.rewrite_span(ReorderOperation::Fill, start, vec![value; end - start]);
        }
        self
    }

    /// Copy `[start, end)` over the items starting at `target`.
    ///
    /// The copy is clipped to the end of the collection; the length never
    /// changes. An empty effective range changes nothing.
    pub fn copy_within(&self, target: isize, start: isize, end: Option<isize>) -> &Self {
        let len = self.len();
        let target = clamp_relative(target, len);
        let start = clamp_relative(start, len);
        let end = resolve_end(end, len);
        let count = end.saturating_sub(start).min(len - target);
        if count > 0 {
            let values = self.slice(Some(start as isize), Some((start + count) as isize));
            self.rewrite_span(ReorderOperation::CopyWithin, target, values);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record_reorders<T: Clone + 'static>(
        collection: &ObservableCollection<T>,
    ) -> Rc<RefCell<Vec<CollectionReorder<T>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        collection
            .collection_reordered()
            .subscribe(move |reorder| sink.borrow_mut().push(reorder.clone()));
        log
    }

    fn moved<T>(pairs: Vec<(usize, T)>) -> Vec<MovedItem<T>> {
        pairs
            .into_iter()
            .map(|(current_index, current_item)| MovedItem {
                current_index,
                current_item,
            })
            .collect()
    }

    #[test]
    fn sort_reports_changed_positions() {
        let collection = ObservableCollection::from_vec(vec![3, 2, 1, 4]);
        let log = record_reorders(&collection);

        collection.sort().unwrap();
        assert_eq!(collection.to_vec(), vec![1, 2, 3, 4]);
        assert_eq!(
            *log.borrow(),
            vec![CollectionReorder {
                operation: ReorderOperation::Sort,
                moved_items: moved(vec![(0, 1), (2, 3)]),
            }]
        );
    }

    #[test]
    fn sorted_input_is_a_no_op() {
        let collection = ObservableCollection::from_vec(vec![1, 2, 3]);
        let log = record_reorders(&collection);

        collection.sort().unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(collection.generation(), 0);
    }

    #[test]
    fn sort_by_custom_order() {
        let collection = ObservableCollection::from_vec(vec!["bb", "a", "ccc"]);
        collection.sort_by(|a, b| b.len().cmp(&a.len())).unwrap();
        assert_eq!(collection.to_vec(), vec!["ccc", "bb", "a"]);
    }

    #[test]
    fn comparator_mutation_aborts_sort() {
        let collection = ObservableCollection::from_vec(vec![2, 1]);
        let handle = collection.clone();

        let result = collection.sort_by(|a, b| {
            if handle.len() == 2 {
                handle.push([0]);
            }
            a.cmp(b)
        });

        assert!(result.is_err());
        assert_eq!(collection.to_vec(), vec![2, 1, 0]);
    }

    #[test]
    fn reverse_reports_every_changed_position() {
        let collection = ObservableCollection::from_vec(vec!['a', 'b', 'c']);
        let log = record_reorders(&collection);

        collection.reverse();
        assert_eq!(collection.to_vec(), vec!['c', 'b', 'a']);
        assert_eq!(
            log.borrow()[0].moved_items,
            moved(vec![(0, 'c'), (2, 'a')])
        );
    }

    #[test]
    fn fill_with_end_before_start_changes_nothing() {
        let collection = ObservableCollection::from_vec(vec![1, 2, 3, 4, 5]);
        let log = record_reorders(&collection);

        let returned = collection.fill(10, Some(3), Some(2));
        assert!(returned.ptr_eq(&collection));
        assert_eq!(collection.to_vec(), vec![1, 2, 3, 4, 5]);
        assert!(log.borrow().is_empty());
        assert_eq!(collection.generation(), 0);
    }

    #[test]
    fn fill_negative_range() {
        let collection = ObservableCollection::from_vec(vec![1, 2, 3, 4, 5]);
        let log = record_reorders(&collection);

        collection.fill(0, Some(-3), Some(-1));
        assert_eq!(collection.to_vec(), vec![1, 2, 0, 0, 5]);
        assert_eq!(log.borrow()[0].operation, ReorderOperation::Fill);
        assert_eq!(log.borrow()[0].moved_items, moved(vec![(2, 0), (3, 0)]));
    }

    #[test]
    fn copy_within_clips_to_length() {
        let collection = ObservableCollection::from_vec(vec![1, 2, 3, 4, 5]);
        let log = record_reorders(&collection);

        collection.copy_within(3, 0, None);
        assert_eq!(collection.to_vec(), vec![1, 2, 3, 1, 2]);
        assert_eq!(
            *log.borrow(),
            vec![CollectionReorder {
                operation: ReorderOperation::CopyWithin,
                moved_items: moved(vec![(3, 1), (4, 2)]),
            }]
        );
    }

    #[test]
    fn copy_within_negative_arguments() {
        let collection = ObservableCollection::from_vec(vec![1, 2, 3, 4, 5]);
        collection.copy_within(-2, -3, Some(-1));
        assert_eq!(collection.to_vec(), vec![1, 2, 3, 3, 4]);
    }

    #[test]
    fn copy_within_empty_range_is_a_no_op() {
        let collection = ObservableCollection::from_vec(vec![1, 2, 3]);
        let log = record_reorders(&collection);

        collection.copy_within(0, 2, Some(1));
        collection.copy_within(3, 0, None);
        assert!(log.borrow().is_empty());
        assert_eq!(collection.generation(), 0);
    }
}
