// ============================================================================
// spark-observables - Ergonomic Macros
// ============================================================================

/// Clone handles into a move closure.
///
/// Event handlers must be `'static`, so every container handle or `Rc`
/// they touch has to be cloned in first. This removes that boilerplate.
///
/// # Usage
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use spark_observables::{cloned, ObservableCollection};
///
/// let items = ObservableCollection::from_vec(vec![1, 2]);
/// let total = Rc::new(Cell::new(0));
///
/// items.collection_changed().subscribe(cloned!(items, total => move |_| {
///     total.set(items.reduce(0, |sum, item, _, _| sum + item).unwrap_or(0));
/// }));
///
/// items.push([3]);
/// assert_eq!(total.get(), 6);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Subscribe a handler to an event, cloning the listed handles into it.
///
/// Expands to `event.subscribe(cloned!(deps => move |args| body))` and
/// returns the [`EventHandlerId`](crate::EventHandlerId).
///
/// # Usage
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use spark_observables::{on, ObservableSet};
///
/// let tags: ObservableSet<&str> = ObservableSet::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// on!(tags.set_changed(), log => |change| {
///     log.borrow_mut().extend(change.added_items.iter().copied());
/// });
///
/// tags.add("urgent");
/// assert_eq!(*log.borrow(), vec!["urgent"]);
/// ```
#[macro_export]
macro_rules! on {
    // Case 1: With handles to clone
    ($event:expr, $($deps:ident),+ => |$args:pat_param| $body:expr) => {
        $event.subscribe($crate::cloned!($($deps),+ => move |$args| $body))
    };
    // Case 2: Nothing to clone
    ($event:expr => |$args:pat_param| $body:expr) => {
        $event.subscribe(move |$args| $body)
    };
}
