//! Synchronization primitives, swapped for loom's under `--features loom`.
//!
//! Only the handoff slot, the rendezvous slots and the metrics counters go
//! through this module, so loom explores every interleaving of the real queue.

#[cfg(feature = "loom")]
pub(crate) use loom::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Condvar, Mutex, MutexGuard,
};

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Condvar, Mutex, MutexGuard,
};

use std::sync::PoisonError;

/// Locks `mutex`, ignoring poisoning.
///
/// Every value guarded in this crate is an `Option` or a plain flag that is
/// written in a single step, so a panic elsewhere cannot leave it half-updated.
#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Blocks on `condvar`, ignoring poisoning (see [`lock`]).
#[inline]
pub(crate) fn wait<'a, T>(condvar: &Condvar, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
    condvar.wait(guard).unwrap_or_else(PoisonError::into_inner)
}
