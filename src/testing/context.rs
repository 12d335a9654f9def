use std::cell::RefCell;
use std::ffi::c_void;
use std::sync::Arc;

use crate::coroutine;
use crate::testing::report::TestReport;

/// Handle passed to user test functions while their body runs on the
/// coroutine worker.
///
/// Records check outcomes into the enclosing report and suspends the body at
/// frame boundaries. GUI-driving calls go through the native per-test
/// pointer, which the engine owns and keeps valid for the duration of the
/// body.
pub struct TestContext {
    name: String,
    report: Arc<TestReport>,
    native: *mut c_void,
}

impl TestContext {
    pub(crate) fn new(name: impl Into<String>, report: Arc<TestReport>, native: *mut c_void) -> Self {
        Self {
            name: name.into(),
            report,
            native,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn report(&self) -> &Arc<TestReport> {
        &self.report
    }

    /// Raw context pointer of the native engine, for GUI-driving calls bound
    /// elsewhere.
    pub fn native_ptr(&self) -> *mut c_void {
        self.native
    }

    /// Record one check outcome into the enclosing report. Returns the
    /// condition so call sites can branch on it.
    pub fn check(&self, label: &str, condition: bool) -> bool {
        self.report.record(label, condition);
        if !condition {
            log::warn!("Test[{}]: check failed: {label}", self.name);
        }
        condition
    }

    /// Suspend the test body until the engine resumes it on the next frame.
    pub fn yield_frame(&self) {
        coroutine::yield_now();
    }
}

thread_local! {
    static CURRENT_CONTEXT: RefCell<Option<Arc<TestContext>>> = const { RefCell::new(None) };
}

/// Run `f` with the ambient test context of the current thread.
///
/// Only set while a test body runs on its coroutine worker: the invocation
/// shim installs the context before calling the user function and removes it
/// when the body returns. It does not propagate into threads the body itself
/// spawns. Helper functions use this to omit an explicit context argument.
pub fn with_current<R>(f: impl FnOnce(&TestContext) -> R) -> Option<R> {
    CURRENT_CONTEXT.with(|c| c.borrow().as_ref().map(|ctx| f(ctx)))
}

/// Scoped installation of the ambient context, restoring the previous value
/// on drop.
pub(crate) struct ContextScope {
    previous: Option<Arc<TestContext>>,
}

impl ContextScope {
    pub(crate) fn enter(ctx: Arc<TestContext>) -> Self {
        let previous = CURRENT_CONTEXT.with(|c| c.borrow_mut().replace(ctx));
        Self { previous }
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_CONTEXT.with(|c| *c.borrow_mut() = previous);
    }
}
