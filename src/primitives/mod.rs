// ============================================================================
// spark-observables - Primitives Module
// Building blocks for objects that announce their own changes
// ============================================================================

pub mod view_model;

// Re-export for convenience
pub use view_model::ViewModel;
