// ============================================================================
// spark-observables - Iteration Guard
// Generation counter that invalidates in-flight enumerations
// ============================================================================
//
// Every container owns one guard. Structural mutations bump the generation
// exactly once; no-op mutations leave it alone. An enumeration snapshots the
// generation when it starts and re-checks it each time it is asked to advance,
// so a mutation is only reported at the point the enumeration is pumped again.
// ============================================================================

use std::cell::Cell;

use super::error::{ContainerKind, ObservableError, Result};

/// Snapshot of a guard's generation taken when an enumeration starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationToken {
    generation: u64,
}

impl IterationToken {
    /// The generation this token was taken at.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Per-container generation counter.
#[derive(Debug)]
pub struct IterationGuard {
    kind: ContainerKind,
    generation: Cell<u64>,
}

impl IterationGuard {
    pub const fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            generation: Cell::new(0),
        }
    }

    /// The container kind reported in invalidation errors.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Snapshot the current generation.
    pub fn start_iteration(&self) -> IterationToken {
        IterationToken {
            generation: self.generation.get(),
        }
    }

    /// Fail if the container changed since `token` was taken.
    pub fn check_iteration(&self, token: IterationToken) -> Result<()> {
        if self.generation.get() == token.generation {
            Ok(())
        } else {
            Err(ObservableError::IterationInvalidated(self.kind()))
        }
    }

    /// Record one structural mutation and return the new generation.
    pub fn bump(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_checks_clean() {
        let guard = IterationGuard::new(ContainerKind::Collection);
        let token = guard.start_iteration();
        assert_eq!(guard.check_iteration(token), Ok(()));
        assert_eq!(token.generation(), 0);
    }

    #[test]
    fn bump_invalidates_older_tokens() {
        let guard = IterationGuard::new(ContainerKind::Set);
        let token = guard.start_iteration();

        assert_eq!(guard.bump(), 1);
        assert_eq!(
            guard.check_iteration(token),
            Err(ObservableError::IterationInvalidated(ContainerKind::Set))
        );

        // A token taken after the bump is valid again
        let fresh = guard.start_iteration();
        assert_eq!(guard.check_iteration(fresh), Ok(()));
    }

    #[test]
    fn generation_is_monotonic() {
        let guard = IterationGuard::new(ContainerKind::Map);
        for expected in 1..=10 {
            assert_eq!(guard.bump(), expected);
        }
        assert_eq!(guard.generation(), 10);
    }
}
