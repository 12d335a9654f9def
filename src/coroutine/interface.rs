use std::ffi::{c_char, c_void, CStr};
use std::ptr;
use std::sync::Arc;

use crate::coroutine::coroutine::Coroutine;
use crate::coroutine::handshake::Handshake;
use crate::coroutine::registry;
use crate::coroutine::worker::{self, BodyCall};

/// A test body entry point, exactly as the native engine passes it to the
/// create callback. Must be a valid function for the coroutine's lifetime.
pub type CoroutineBodyFn = extern "C" fn(arg: *mut c_void);

/// Opaque coroutine handle exchanged with the native engine. Points at a
/// [`Coroutine`]; only this module reads it back. A handle is valid from
/// create until destroy; using it afterwards is a caller bug.
pub type CoroutineHandle = *mut c_void;

pub type CreateFn =
    extern "C" fn(body: CoroutineBodyFn, name: *const c_char, arg: *mut c_void) -> CoroutineHandle;
pub type DestroyFn = extern "C" fn(handle: CoroutineHandle);
pub type RunFn = extern "C" fn(handle: CoroutineHandle) -> bool;
pub type YieldFn = extern "C" fn();

/// The callback table registered into the native engine's I/O configuration
/// at context creation. Registered once; lives for the whole process.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct CoroutineInterface {
    pub create: CreateFn,
    pub destroy: DestroyFn,
    pub run: RunFn,
    pub yield_: YieldFn,
}

/// Thread-backed implementation of the engine's coroutine contract.
pub static THREADED_COROUTINES: CoroutineInterface = CoroutineInterface {
    create: coroutine_create,
    destroy: coroutine_destroy,
    run: coroutine_run,
    yield_: coroutine_yield,
};

/// create callback: allocate a coroutine for `body` and park its worker at
/// the entry gate.
///
/// Returns a null handle (and logs) when another coroutine is still active or
/// the worker thread cannot be spawned. Never unwinds into the caller.
pub extern "C" fn coroutine_create(
    body: CoroutineBodyFn,
    name: *const c_char,
    arg: *mut c_void,
) -> CoroutineHandle {
    let name = if name.is_null() {
        String::from("<unnamed>")
    } else {
        unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned()
    };

    let handshake = Arc::new(Handshake::new());
    let coro = Arc::new(Coroutine::new(name.clone(), handshake.clone()));

    if !registry::install(coro.clone()) {
        log::error!("Coroutine[{name}]: create refused, another coroutine is still active");
        return ptr::null_mut();
    }

    match worker::spawn_worker(&name, BodyCall { body, arg }, handshake) {
        Ok(handle) => coro.attach_worker(handle),
        Err(e) => {
            log::error!("Coroutine[{name}]: cannot spawn worker thread: {e}");
            registry::clear(&coro);
            return ptr::null_mut();
        }
    }

    Arc::into_raw(coro) as CoroutineHandle
}

/// destroy callback: join the worker and release the handle.
///
/// Refused (logged, no-op, slot left occupied) while the test body has not
/// terminated; the engine is expected to call run until it returns false
/// first.
pub extern "C" fn coroutine_destroy(handle: CoroutineHandle) {
    if handle.is_null() {
        log::error!("Coroutine: destroy called with a null handle");
        return;
    }

    let coro = unsafe { &*(handle as *const Coroutine) };
    if !coro.is_terminated() {
        log::error!(
            "Coroutine[{}]: destroy called before the test body terminated",
            coro.name()
        );
        return;
    }

    coro.join_worker();

    let coro = unsafe { Arc::from_raw(handle as *const Coroutine) };
    registry::clear(&coro);
}

/// run callback: release the worker for one slice.
///
/// Returns `true` when the body yielded and is still alive, `false` when it
/// terminated (or had already terminated, in which case the worker is not
/// signaled at all).
pub extern "C" fn coroutine_run(handle: CoroutineHandle) -> bool {
    if handle.is_null() {
        log::error!("Coroutine: run called with a null handle");
        return false;
    }

    let coro = unsafe { &*(handle as *const Coroutine) };
    coro.resume()
}

/// yield callback: suspend the active coroutine until the next run.
///
/// The engine's ABI passes no handle here; the coroutine is resolved through
/// the process-wide registry. Calling this while no coroutine is active is a
/// contract violation by the embedder: logged, then ignored.
pub extern "C" fn coroutine_yield() {
    match registry::active() {
        Some(coro) => coro.handshake().yield_point(),
        None => log::error!("Coroutine: yield called while no coroutine is active"),
    }
}

/// Host-side suspension helper. Same path as the native yield callback, for
/// test bodies written in Rust.
pub fn yield_now() {
    coroutine_yield();
}
