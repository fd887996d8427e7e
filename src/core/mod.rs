// ============================================================================
// spark-observables - Core Module
// Errors, iteration guard and index arithmetic shared by every container
// ============================================================================

pub mod constants;
pub mod error;
pub mod guard;
pub mod index;

// Re-export commonly used items
pub use constants::{DEFAULT_SEPARATOR, LENGTH, SIZE};
pub use error::{ContainerKind, ObservableError, Result};
pub use guard::{IterationGuard, IterationToken};
