use std::ffi::{c_char, c_void};

use crate::coroutine::interface::{CoroutineBodyFn, CoroutineInterface};

pub mod null;

/// Function-pointer contract exported by the wrapped native test engine.
///
/// The engine itself is out of scope for this crate; everything the host does
/// goes through this table. [`null`] ships a pure-Rust stand-in used by the
/// demo and the test suite.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct NativeEngineApi {
    /// Allocate a fresh engine context.
    pub context_create: extern "C" fn() -> *mut c_void,
    /// Tear down a context created by `context_create`.
    pub context_destroy: extern "C" fn(ctx: *mut c_void),
    /// Install the coroutine backend into the context's I/O configuration.
    /// Registered once, at context creation.
    pub set_coroutine_interface:
        extern "C" fn(ctx: *mut c_void, iface: *const CoroutineInterface),
    /// Select the pacing the engine uses when driving the GUI.
    pub set_run_speed: extern "C" fn(ctx: *mut c_void, speed: i32),
    /// Store a test under `name`; `body`/`arg` become the coroutine entry
    /// point when the test is queued.
    pub register_test: extern "C" fn(
        ctx: *mut c_void,
        name: *const c_char,
        body: CoroutineBodyFn,
        arg: *mut c_void,
    ),
    /// Queue a registered test for the next run. Returns `false` when `name`
    /// is unknown.
    pub queue_test: extern "C" fn(ctx: *mut c_void, name: *const c_char, flags: u32) -> bool,
    /// Drive the engine for one frame. Returns `true` while tests are still
    /// queued or running.
    pub tick: extern "C" fn(ctx: *mut c_void) -> bool,
}
