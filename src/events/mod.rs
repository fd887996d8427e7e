// ============================================================================
// spark-observables - Events
// Publish/subscribe primitive and the change descriptors it carries
// ============================================================================

pub mod args;
pub mod event;
pub mod notify;

pub use args::{
    CollectionChange, CollectionReorder, MapChange, MovedItem, PropertiesChanged,
    ReorderOperation, SetChange,
};
pub use event::{Event, EventHandlerId};
pub use notify::NotifyPropertiesChanged;
