// ============================================================================
// spark-observables - ViewModel
// Base for objects that announce their own property changes
// ============================================================================
//
// A view model embeds a `ViewModel` and routes every property write through
// `set_property`, which stores the value and raises `properties_changed`
// only when the value actually differs. UI bindings subscribe through the
// `NotifyPropertiesChanged` trait and re-render on each raise.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;

#[cfg(feature = "tracing")]
use crate::core::constants::TRACE_TARGET;
use crate::events::{Event, NotifyPropertiesChanged, PropertiesChanged};

/// Property-change plumbing for a view model.
///
/// # Example
///
/// ```
/// use std::cell::{Cell, RefCell};
/// use std::rc::Rc;
/// use spark_observables::{Event, NotifyPropertiesChanged, PropertiesChanged, ViewModel};
///
/// struct Person {
///     base: ViewModel,
///     name: RefCell<String>,
/// }
///
/// impl Person {
///     fn set_name(&self, name: &str) {
///         self.base.set_property(&self.name, "name", name.to_string());
///     }
/// }
///
/// impl NotifyPropertiesChanged for Person {
///     fn properties_changed(&self) -> &Event<PropertiesChanged> {
///         self.base.properties_changed()
///     }
/// }
///
/// let person = Person { base: ViewModel::new(), name: RefCell::new(String::new()) };
/// let renders = Rc::new(Cell::new(0));
///
/// let counter = renders.clone();
/// person.properties_changed().subscribe(move |_| counter.set(counter.get() + 1));
///
/// person.set_name("Ada");
/// person.set_name("Ada"); // unchanged, no notification
/// assert_eq!(renders.get(), 1);
/// ```
#[derive(Default)]
pub struct ViewModel {
    properties_changed: Event<PropertiesChanged>,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `properties_changed` once with `names`. Nothing is raised for
    /// an empty list.
    pub fn notify_properties_changed(&self, names: &[&'static str]) {
        if names.is_empty() {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: TRACE_TARGET,
            kind = "view_model",
            properties = ?names,
            "properties changed"
        );

        self.properties_changed
            .raise(&PropertiesChanged::new(names.to_vec()));
    }

    /// Store `value` in `slot` and announce `name` if it differs from the
    /// current value. Returns whether anything changed.
    pub fn set_property<V: PartialEq>(
        &self,
        slot: &RefCell<V>,
        name: &'static str,
        value: V,
    ) -> bool {
        {
            let mut current = slot.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        // Borrow released: handlers may read the property
        self.notify_properties_changed(&[name]);
        true
    }

    /// [`set_property`](Self::set_property) for `Copy` values held in a `Cell`.
    pub fn set_cell_property<V: Copy + PartialEq>(
        &self,
        slot: &Cell<V>,
        name: &'static str,
        value: V,
    ) -> bool {
        if slot.get() == value {
            return false;
        }
        slot.set(value);
        self.notify_properties_changed(&[name]);
        true
    }
}

impl NotifyPropertiesChanged for ViewModel {
    fn properties_changed(&self) -> &Event<PropertiesChanged> {
        &self.properties_changed
    }
}

impl fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("subscriber_count", &self.properties_changed.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct Counter {
        base: ViewModel,
        count: Cell<u32>,
        label: RefCell<String>,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                base: ViewModel::new(),
                count: Cell::new(0),
                label: RefCell::new(String::new()),
            }
        }

        fn increment(&self) {
            self.base
                .set_cell_property(&self.count, "count", self.count.get() + 1);
        }
    }

    fn record(model: &ViewModel) -> Rc<RefCell<Vec<Vec<&'static str>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        model
            .properties_changed()
            .subscribe(move |args| sink.borrow_mut().push(args.changed_properties.clone()));
        log
    }

    #[test]
    fn changed_value_notifies_once() {
        let counter = Counter::new();
        let log = record(&counter.base);

        counter.increment();
        counter.increment();
        assert_eq!(counter.count.get(), 2);
        assert_eq!(*log.borrow(), vec![vec!["count"], vec!["count"]]);
    }

    #[test]
    fn equal_value_is_silent() {
        let counter = Counter::new();
        let log = record(&counter.base);

        assert!(!counter.base.set_property(&counter.label, "label", String::new()));
        assert!(counter.base.set_property(&counter.label, "label", "x".to_string()));
        assert_eq!(*log.borrow(), vec![vec!["label"]]);
    }

    #[test]
    fn batch_notification_lists_every_name() {
        let model = ViewModel::new();
        let log = record(&model);

        model.notify_properties_changed(&[]);
        model.notify_properties_changed(&["first", "last"]);
        assert_eq!(*log.borrow(), vec![vec!["first", "last"]]);
    }

    #[test]
    fn handler_can_read_property_during_notification() {
        let counter = Rc::new(Counter::new());
        let seen = Rc::new(RefCell::new(String::new()));

        let reader = Rc::downgrade(&counter);
        let sink = seen.clone();
        counter.base.properties_changed().subscribe(move |_| {
            if let Some(counter) = reader.upgrade() {
                *sink.borrow_mut() = counter.label.borrow().clone();
            }
        });

        counter
            .base
            .set_property(&counter.label, "label", "hello".to_string());
        assert_eq!(*seen.borrow(), "hello");
    }
}
