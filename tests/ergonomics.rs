use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_observables::{
    Event, NotifyPropertiesChanged, ObservableCollection, ObservableSet, PropertiesChanged,
    ViewModel, cloned, on,
};

#[test]
fn cloned_macro_captures_handles() {
    let items = ObservableCollection::from_vec(vec![1, 2, 3]);
    let total = Rc::new(Cell::new(0));

    // Old way
    items.collection_changed().subscribe({
        let items = items.clone();
        let total = total.clone();
        move |_| total.set(items.len())
    });

    // New way
    let doubled = Rc::new(Cell::new(0));
    items
        .collection_changed()
        .subscribe(cloned!(items, doubled => move |_| doubled.set(items.len() * 2)));

    items.push([4]);
    assert_eq!(total.get(), 4);
    assert_eq!(doubled.get(), 8);
}

#[test]
fn on_macro_without_handles() {
    let event: Event<u32> = Event::new();
    let id = on!(event => |value| assert_eq!(*value, 7));

    event.raise(&7);
    assert!(event.unsubscribe(id));
}

#[test]
fn tag_summary_follows_set() {
    let tags: ObservableSet<&'static str> = ObservableSet::new();
    let summary = Rc::new(RefCell::new(String::new()));

    on!(tags.properties_changed(), tags, summary => |_| {
        *summary.borrow_mut() = tags.to_vec().join(" ");
    });

    tags.add("rust");
    tags.add("events");
    tags.add("rust");
    assert_eq!(*summary.borrow(), "rust events");

    tags.delete("rust");
    assert_eq!(*summary.borrow(), "events");
}

// =============================================================================
// VIEW MODEL
// =============================================================================

struct Todo {
    base: ViewModel,
    title: RefCell<String>,
    done: Cell<bool>,
}

impl Todo {
    fn new(title: &str) -> Self {
        Self {
            base: ViewModel::new(),
            title: RefCell::new(title.to_string()),
            done: Cell::new(false),
        }
    }

    fn rename(&self, title: &str) -> bool {
        self.base.set_property(&self.title, "title", title.to_string())
    }

    fn toggle(&self) {
        self.base
            .set_cell_property(&self.done, "done", !self.done.get());
    }

    /// Update both fields and announce them together.
    fn complete_as(&self, title: &str) {
        *self.title.borrow_mut() = title.to_string();
        self.done.set(true);
        self.base.notify_properties_changed(&["title", "done"]);
    }
}

impl NotifyPropertiesChanged for Todo {
    fn properties_changed(&self) -> &Event<PropertiesChanged> {
        self.base.properties_changed()
    }
}

#[test]
fn view_model_announces_real_changes() {
    let todo = Rc::new(Todo::new("write tests"));
    let log = Rc::new(RefCell::new(Vec::new()));
    on!(todo.properties_changed(), log => |args| {
        log.borrow_mut().push(args.changed_properties.clone());
    });

    assert!(!todo.rename("write tests"));
    assert!(todo.rename("write more tests"));
    todo.toggle();
    todo.complete_as("ship it");

    assert_eq!(
        *log.borrow(),
        vec![vec!["title"], vec!["done"], vec!["title", "done"]]
    );
    assert!(todo.done.get());
}

#[test]
fn bindings_work_through_the_trait() {
    fn bind(source: &dyn NotifyPropertiesChanged, hits: &Rc<Cell<u32>>) {
        on!(source.properties_changed(), hits => |_| hits.set(hits.get() + 1));
    }

    let hits = Rc::new(Cell::new(0));
    let todo = Todo::new("a");
    let list: ObservableCollection<u8> = ObservableCollection::new();
    bind(&todo, &hits);
    bind(&list, &hits);

    todo.toggle();
    list.push([1, 2]);
    list.reverse();

    assert_eq!(hits.get(), 2);
}
