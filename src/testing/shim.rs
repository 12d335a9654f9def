use std::any::Any;
use std::ffi::{c_void, CString};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::testing::context::{ContextScope, TestContext};
use crate::testing::report::{self, TestReport};
use crate::testing::TestId;

/// Host-side registration of one test function.
///
/// The boxed registration is pinned for the lifetime of the engine context;
/// its address is the opaque argument the native engine stores alongside the
/// test and passes back when the coroutine body runs.
pub struct TestRegistration {
    id: TestId,
    name: CString,
    func: Box<dyn Fn(&TestContext) + Send + Sync>,
    engine_ctx: *mut c_void,
}

impl TestRegistration {
    pub(crate) fn new(
        id: TestId,
        name: CString,
        func: Box<dyn Fn(&TestContext) + Send + Sync>,
        engine_ctx: *mut c_void,
    ) -> Box<Self> {
        Box::new(Self {
            id,
            name,
            func,
            engine_ctx,
        })
    }

    pub fn id(&self) -> TestId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.to_str().unwrap_or("<invalid>")
    }

    pub(crate) fn name_ptr(&self) -> *const std::ffi::c_char {
        self.name.as_ptr()
    }

    pub(crate) fn as_arg(&self) -> *mut c_void {
        self as *const Self as *mut c_void
    }
}

/// Coroutine body used for every registered test: the single point where the
/// native engine's trampoline re-enters host code.
///
/// Panics from the user function are contained here, logged, and converted
/// into plain termination; the native engine only ever observes that the body
/// returned. Checks recorded before a panic stay in the report, the crashed
/// portion records nothing further.
pub extern "C" fn test_trampoline(arg: *mut c_void) {
    if arg.is_null() {
        log::error!("Test trampoline invoked with a null registration");
        return;
    }

    let registration = unsafe { &*(arg as *const TestRegistration) };
    let name = registration.name().to_string();

    let report = report::current().unwrap_or_else(|| TestReport::new(name.clone()));
    let ctx = Arc::new(TestContext::new(
        name.clone(),
        report,
        registration.engine_ctx,
    ));
    let _ambient = ContextScope::enter(ctx.clone());

    let result = panic::catch_unwind(AssertUnwindSafe(|| (registration.func)(&ctx)));
    if let Err(payload) = result {
        log::error!("Test[{name}]: body panicked: {}", panic_message(&payload));
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::report::ReportScope;
    use std::ptr;

    fn registration(name: &str, func: impl Fn(&TestContext) + Send + Sync + 'static) -> Box<TestRegistration> {
        TestRegistration::new(
            TestId::new(),
            CString::new(name).unwrap(),
            Box::new(func),
            ptr::null_mut(),
        )
    }

    #[test]
    fn trampoline_records_into_the_ambient_report() {
        let report = TestReport::new("ambient");
        let _scope = ReportScope::enter(report.clone());

        let reg = registration("shim-test", |ctx| {
            ctx.check("works", true);
        });

        test_trampoline(reg.as_arg());
        assert_eq!(report.passed(), 1);
    }

    #[test]
    fn trampoline_falls_back_to_a_fresh_report() {
        // No ambient report installed: the body still runs, its checks go to
        // a report private to this invocation.
        let reg = registration("orphan", |ctx| {
            ctx.check("still recorded somewhere", true);
        });

        test_trampoline(reg.as_arg());
    }

    #[test]
    fn trampoline_contains_panics_and_keeps_prior_checks() {
        let report = TestReport::new("panicky");
        let _scope = ReportScope::enter(report.clone());

        let reg = registration("explodes", |ctx| {
            ctx.check("before the bang", true);
            panic!("bang");
        });

        test_trampoline(reg.as_arg());

        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 0);
        // The ambient context did not leak out of the crashed body.
        assert!(crate::testing::context::with_current(|_| ()).is_none());
    }

    #[test]
    fn trampoline_ignores_a_null_registration() {
        test_trampoline(ptr::null_mut());
    }
}
