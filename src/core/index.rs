// ============================================================================
// spark-observables - Index Normalisation
// Relative index arithmetic matching native array rules
// ============================================================================
//
// Two families of rules:
//
// - Range arguments (slice, splice, fill, copy_within, index_of): negative
//   values count back from the end and the result is clamped to [0, len].
// - Element access (get, set, at): negative values count back from the end
//   but are not clamped; a result below zero is an error for the caller.
// ============================================================================

/// Resolve a range bound: negative counts from the end, clamped to `[0, len]`.
pub fn clamp_relative(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        index.unsigned_abs().min(len)
    }
}

/// Resolve an optional start bound (missing means 0).
pub fn resolve_start(start: Option<isize>, len: usize) -> usize {
    start.map_or(0, |start| clamp_relative(start, len))
}

/// Resolve an optional end bound (missing means `len`).
pub fn resolve_end(end: Option<isize>, len: usize) -> usize {
    end.map_or(len, |end| clamp_relative(end, len))
}

/// Resolve an element index without clamping.
///
/// Returns `None` when a negative index reaches past the front. The result
/// may be `>= len`; callers decide whether that is an error or a growth.
pub fn wrap_index(index: isize, len: usize) -> Option<usize> {
    if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index.unsigned_abs())
    }
}

/// Starting position for a backwards search (`last_index_of`).
///
/// Missing means the last element. Positive values clamp to the last
/// element; negative values count from the end and give up below zero.
pub fn last_search_start(from: Option<isize>, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    match from {
        None => Some(last),
        Some(from) if from >= 0 => Some(from.unsigned_abs().min(last)),
        Some(from) => len.checked_sub(from.unsigned_abs()),
    }
}
