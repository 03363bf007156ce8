//! Single-slot ownership handoff.
//!
//! The shared state is not guarded in place: it lives in a one-value slot and
//! callers move it out, work on their own copy, and move it back. Owning the
//! value and holding the lock are the same thing, so no caller can touch the
//! state without having taken it.

#[cfg(debug_assertions)]
use crate::invariants::debug_assert_slot_vacant;
use crate::sync::{lock, wait, Condvar, Mutex};
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

/// A slot seeded with exactly one value, passed between callers one at a time.
pub(crate) struct Handoff<S> {
    slot: Mutex<Option<S>>,
    returned: Condvar,
}

impl<S> Handoff<S> {
    /// Creates a handoff holding `value`.
    pub(crate) fn new(value: S) -> Self {
        Self {
            slot: Mutex::new(Some(value)),
            returned: Condvar::new(),
        }
    }

    /// Takes the value out of the slot, blocking while another caller owns it.
    ///
    /// The value goes back into the slot when the returned guard drops.
    pub(crate) fn take(&self) -> Owned<'_, S> {
        let mut slot = lock(&self.slot);
        loop {
            if let Some(value) = slot.take() {
                return Owned {
                    handoff: self,
                    value: ManuallyDrop::new(value),
                };
            }
            slot = wait(&self.returned, slot);
        }
    }

    fn put_back(&self, value: S) {
        let mut slot = lock(&self.slot);
        #[cfg(debug_assertions)]
        debug_assert_slot_vacant!(slot.is_some());
        *slot = Some(value);
        drop(slot);
        // Only one value went back, so only one taker can make progress.
        self.returned.notify_one();
    }

    #[cfg(all(test, not(feature = "loom")))]
    fn is_held(&self) -> bool {
        lock(&self.slot).is_none()
    }
}

/// Exclusive ownership of the handoff's value.
///
/// Dropping the guard puts the value back on every exit path, unwinding
/// included.
pub(crate) struct Owned<'a, S> {
    handoff: &'a Handoff<S>,
    value: ManuallyDrop<S>,
}

impl<S> Deref for Owned<'_, S> {
    type Target = S;

    #[inline]
    fn deref(&self) -> &S {
        &self.value
    }
}

impl<S> DerefMut for Owned<'_, S> {
    #[inline]
    fn deref_mut(&mut self) -> &mut S {
        &mut self.value
    }
}

impl<S> Drop for Owned<'_, S> {
    fn drop(&mut self) {
        // SAFETY: `value` is initialized from construction until here and is
        // never touched again after being taken.
        let value = unsafe { ManuallyDrop::take(&mut self.value) };
        self.handoff.put_back(value);
    }
}
