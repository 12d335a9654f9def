use std::ffi::c_void;
use std::sync::Arc;
use std::thread;

use crate::coroutine::handshake::Handshake;
use crate::coroutine::interface::CoroutineBodyFn;
use crate::testing::report::{self, ReportScope};

/// A test body as handed over by the native engine: a C function pointer and
/// its opaque argument.
///
/// The pair is moved onto the worker thread. The engine keeps the argument
/// alive for the whole coroutine lifetime, and the handshake guarantees that
/// only one thread executes test code at any moment, so sending the raw
/// pointer across is sound.
pub(crate) struct BodyCall {
    pub body: CoroutineBodyFn,
    pub arg: *mut c_void,
}

unsafe impl Send for BodyCall {}

/// Spawn the worker thread for one coroutine.
///
/// The worker parks at the handshake's entry gate, runs the body once
/// released, and always reports termination through [`Handshake::finish`].
/// The current test report of the spawning thread is captured here and
/// re-installed inside the worker (copy-on-spawn), so checks recorded by the
/// body land in the report that was active when the engine created the
/// coroutine.
pub(crate) fn spawn_worker(
    name: &str,
    call: BodyCall,
    handshake: Arc<Handshake>,
) -> std::io::Result<thread::JoinHandle<()>> {
    let inherited_report = report::current();

    thread::Builder::new()
        .name(format!("uitest-coro-{name}"))
        .spawn(move || {
            // Capture the whole `BodyCall` (which is `Send`) rather than its
            // individual fields, so the raw pointer travels inside the wrapper.
            let call = call;
            let _scope = inherited_report.map(ReportScope::enter);

            handshake.await_start();
            (call.body)(call.arg);
            handshake.finish();
        })
}
