use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;

use crate::coroutine::coroutine::Coroutine;

lazy_static! {
    /// Process-wide slot for the one live coroutine.
    ///
    /// The yield callback carries no handle, so the active coroutine must be
    /// discoverable globally. The native engine runs tests strictly one at a
    /// time; a second occupant is refused at create time.
    // TODO: turn the slot into a handle-keyed map if a future engine version
    // starts overlapping coroutines.
    static ref ACTIVE: Mutex<Option<Arc<Coroutine>>> = Mutex::new(None);
}

/// Claim the slot for `coro`. Returns `false` when it is already occupied.
pub(crate) fn install(coro: Arc<Coroutine>) -> bool {
    let mut slot = ACTIVE.lock().unwrap();
    if slot.is_some() {
        return false;
    }
    *slot = Some(coro);
    true
}

/// The coroutine currently occupying the slot, if any.
pub(crate) fn active() -> Option<Arc<Coroutine>> {
    ACTIVE.lock().unwrap().clone()
}

/// Clear the slot, but only when `coro` is the occupant.
pub(crate) fn clear(coro: &Arc<Coroutine>) {
    let mut slot = ACTIVE.lock().unwrap();
    if slot.as_ref().is_some_and(|held| Arc::ptr_eq(held, coro)) {
        *slot = None;
    }
}

/// The slot is process-wide state; tests that drive coroutines take this
/// guard so they do not interleave.
#[cfg(test)]
pub(crate) fn serialize_tests() -> std::sync::MutexGuard<'static, ()> {
    lazy_static! {
        static ref SERIAL: Mutex<()> = Mutex::new(());
    }
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}
