// ============================================================================
// spark-observables - Errors
// ============================================================================

use std::fmt;

use thiserror::Error;

/// Which kind of container raised an error.
///
/// The display form is the word used in user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Collection,
    Set,
    Map,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerKind::Collection => "Collection",
            ContainerKind::Set => "Set",
            ContainerKind::Map => "Map",
        };
        f.write_str(name)
    }
}

/// Errors raised synchronously by observable containers.
///
/// A failing call never leaves partial state behind: validation happens
/// before the backing storage is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObservableError {
    /// Direct indexed access outside `[0, length)` after normalisation.
    #[error("Index {index} is out of range (length: {length})")]
    IndexOutOfRange { index: isize, length: usize },

    /// Growing to `length` items could not be allocated.
    #[error("Invalid length {length}")]
    InvalidLength { length: usize },

    /// The container was structurally mutated while an enumeration was in flight.
    #[error("{0} has changed while being iterated.")]
    IterationInvalidated(ContainerKind),
}

pub type Result<T> = std::result::Result<T, ObservableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_messages_name_the_container() {
        assert_eq!(
            ObservableError::IterationInvalidated(ContainerKind::Collection).to_string(),
            "Collection has changed while being iterated."
        );
        assert_eq!(
            ObservableError::IterationInvalidated(ContainerKind::Set).to_string(),
            "Set has changed while being iterated."
        );
        assert_eq!(
            ObservableError::IterationInvalidated(ContainerKind::Map).to_string(),
            "Map has changed while being iterated."
        );
    }

    #[test]
    fn range_message_carries_index_and_length() {
        let err = ObservableError::IndexOutOfRange { index: -4, length: 3 };
        assert_eq!(err.to_string(), "Index -4 is out of range (length: 3)");
    }

    #[test]
    fn length_message_carries_requested_length() {
        let err = ObservableError::InvalidLength { length: 7 };
        assert_eq!(err.to_string(), "Invalid length 7");
    }
}
