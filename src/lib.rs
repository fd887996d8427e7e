// ============================================================================
// spark-observables - Observable Collections for Rust
// ============================================================================
//
// Array-like collections, sets and maps that announce every change with a
// precise descriptor, plus a view-model base that announces its own property
// writes. Everything is synchronous and single-threaded: handlers run inside
// the mutating call, in subscription order, before it returns.
// ============================================================================

pub mod collections;
pub mod core;
pub mod events;
mod macros;
pub mod primitives;

// Re-export core items at crate root for ergonomic access
pub use core::constants::{DEFAULT_SEPARATOR, LENGTH, SIZE};
pub use core::error::{ContainerKind, ObservableError, Result};
pub use core::guard::{IterationGuard, IterationToken};

// Re-export events
pub use events::{
    CollectionChange, CollectionReorder, Event, EventHandlerId, MapChange, MovedItem,
    NotifyPropertiesChanged, PropertiesChanged, ReorderOperation, SetChange,
};

// Re-export collections
pub use collections::{
    Iter, JoinItem, MapIter, ObservableCollection, ObservableMap, ObservableSet, SetIter,
};

// Re-export primitives
pub use primitives::ViewModel;

// =============================================================================
// TESTS
// =============================================================================
