//! Debug assertion macros for queue invariants.
//!
//! They are only active in debug builds (`#[cfg(debug_assertions)]`), so there
//! is zero overhead in release builds.

// =============================================================================
// Exclusive ownership of the shared state
// =============================================================================

/// Assert that the handoff slot is empty when the state is put back.
///
/// **Invariant**: the slot holds zero or one state values; it is empty exactly
/// while one caller owns the state.
///
/// Used in: `Handoff::put_back()`
macro_rules! debug_assert_slot_vacant {
    ($occupied:expr) => {
        debug_assert!(
            !$occupied,
            "exclusive ownership violated: state returned to an occupied handoff slot"
        )
    };
}

// =============================================================================
// Batch atomicity
// =============================================================================

/// Assert that a delivered batch holds exactly the requested count.
///
/// **Invariant**: `batch.len() == n` for every delivery
///
/// Used in: `Waiter::serve()`, `SharedState::take_ready()`
macro_rules! debug_assert_batch_exact {
    ($len:expr, $n:expr) => {
        debug_assert!(
            $len == $n,
            "batch atomicity violated: delivering {} items to a request for {}",
            $len,
            $n
        )
    };
}

// =============================================================================
// Strict FIFO among waiters
// =============================================================================

/// Assert that the fast path is only taken with no older waiter pending.
///
/// **Invariant**: `take_ready() succeeds ⟹ waiters.is_empty()`
///
/// Used in: `SharedState::take_ready()`
macro_rules! debug_assert_no_older_waiter {
    ($waiters:expr) => {
        debug_assert!(
            $waiters == 0,
            "FIFO violated: fast path taken with {} older waiters pending",
            $waiters
        )
    };
}

/// Assert that reconciliation stopped at a blocked head (or an empty list).
///
/// **Invariant**: `waiters.is_empty() ∨ items.len() < waiters[0].n`
///
/// Used in: `SharedState::reconcile()`, `SharedState::enqueue_waiter()`
macro_rules! debug_assert_head_blocked {
    ($buffered:expr, $head_n:expr) => {
        debug_assert!(
            match $head_n {
                Some(n) => $buffered < n,
                None => true,
            },
            "head-of-line violated: {} items buffered but head waiter (n = {:?}) left pending",
            $buffered,
            $head_n
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_batch_exact;
pub(crate) use debug_assert_head_blocked;
pub(crate) use debug_assert_no_older_waiter;
pub(crate) use debug_assert_slot_vacant;
