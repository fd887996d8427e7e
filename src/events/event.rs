// ============================================================================
// spark-observables - Event
// Ordered, synchronous publish/subscribe
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handler stored by an [`Event`].
type Handler<A> = Rc<dyn Fn(&A)>;

/// Identifies one subscription on one [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventHandlerId(u64);

/// A synchronous event with any number of subscribers.
///
/// Handlers run in subscription order, directly inside [`raise`](Event::raise).
/// The handler list is snapshotted before the first handler runs, so a
/// handler may subscribe or unsubscribe (itself or others) without
/// disturbing the pass that is already under way.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use spark_observables::Event;
///
/// let event: Event<i32> = Event::new();
/// let total = Rc::new(Cell::new(0));
///
/// let sink = total.clone();
/// let id = event.subscribe(move |value| sink.set(sink.get() + *value));
///
/// event.raise(&2);
/// event.raise(&3);
/// assert_eq!(total.get(), 5);
///
/// assert!(event.unsubscribe(id));
/// event.raise(&100);
/// assert_eq!(total.get(), 5);
/// ```
pub struct Event<A> {
    handlers: RefCell<Vec<(EventHandlerId, Handler<A>)>>,
    next_id: Cell<u64>,
}

impl<A> Event<A> {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a handler. It runs on every subsequent raise until unsubscribed.
    pub fn subscribe<F>(&self, handler: F) -> EventHandlerId
    where
        F: Fn(&A) + 'static,
    {
        let id = EventHandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Remove a handler.
    ///
    /// Returns false (and does nothing else) if `id` is not subscribed.
    pub fn unsubscribe(&self, id: EventHandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        match handlers.iter().position(|(existing, _)| *existing == id) {
            Some(position) => {
                handlers.remove(position);
                true
            }
            None => false,
        }
    }

    /// Whether `id` is currently subscribed.
    pub fn is_subscribed(&self, id: EventHandlerId) -> bool {
        self.handlers.borrow().iter().any(|(existing, _)| *existing == id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn has_subscribers(&self) -> bool {
        !self.handlers.borrow().is_empty()
    }

    /// Call every current handler with `args`, in subscription order.
    pub fn raise(&self, args: &A) {
        // No borrow may be held while handlers run: they can re-enter.
        let snapshot: Vec<Handler<A>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in &snapshot {
            handler(args);
        }
    }

    /// Build the arguments only if someone is listening, then raise.
    pub fn raise_with(&self, args: impl FnOnce() -> A) {
        if self.has_subscribers() {
            self.raise(&args());
        }
    }
}

impl<A> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
