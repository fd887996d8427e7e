// ============================================================================
// spark-observables - Observable Collections
// Collections, Sets, and Maps that announce every change
// ============================================================================
//
// Each container raises two kinds of notification:
//
// 1. A structural event describing exactly what changed
//    (`collection_changed` / `collection_reordered`, `set_changed`, `map_changed`)
// 2. `properties_changed` for the derived count (`length` / `size`), only
//    when it actually moved, always after the structural event
//
// Each container also owns an iteration guard: live iterators and scans fail
// on their next step once the container has been structurally mutated.
// ============================================================================

mod collection;
mod join;
mod map;
mod reorder;
mod set;

pub use collection::{Iter, ObservableCollection};
pub use join::JoinItem;
pub use map::{MapIter, ObservableMap};
pub use set::{ObservableSet, SetIter};
