// ============================================================================
// spark-observables - Property Notification
//
// The seam UI bindings subscribe through. Anything that exposes derived or
// user-facing properties raises `properties_changed` when they change.
// ============================================================================

use super::args::PropertiesChanged;
use super::event::Event;

/// A source of property-change notifications.
///
/// Implemented by every observable container (for `length` / `size`) and by
/// [`ViewModel`](crate::ViewModel). A binding only needs this trait to
/// re-render when properties change.
pub trait NotifyPropertiesChanged {
    /// The event raised after one or more properties changed.
    fn properties_changed(&self) -> &Event<PropertiesChanged>;
}

impl<N: NotifyPropertiesChanged + ?Sized> NotifyPropertiesChanged for std::rc::Rc<N> {
    fn properties_changed(&self) -> &Event<PropertiesChanged> {
        (**self).properties_changed()
    }
}
