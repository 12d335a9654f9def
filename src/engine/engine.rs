use std::ffi::{c_void, CString};
use std::ptr;
use std::sync::Arc;

use crate::config::{EngineConfig, RunFlags};
use crate::coroutine::THREADED_COROUTINES;
use crate::engine::native::NativeEngineApi;
use crate::errors::EngineError;
use crate::testing::report::{ReportScope, ReportSummary, TestReport};
use crate::testing::shim::{test_trampoline, TestRegistration};
use crate::testing::{TestContext, TestId};

/// Host-side handle to one native engine context.
///
/// The context pointer is foreign-owned and not reference counted: it is
/// acquired in [`new`](Self::new), released exactly once in
/// [`shutdown`](Self::shutdown) (or by `Drop` as the fallback), and every
/// operation after release reports [`EngineError::ContextDestroyed`].
pub struct UiTestEngine {
    config: EngineConfig,
    api: NativeEngineApi,
    ctx: *mut c_void,
    /// Registrations are boxed so their addresses stay stable; the native
    /// engine keeps those addresses for as long as the context lives.
    tests: Vec<Box<TestRegistration>>,
}

impl UiTestEngine {
    /// Create a native engine context and install the threaded coroutine
    /// backend into it.
    ///
    /// If `config` is `None`, [`EngineConfig::default`] is used.
    pub fn new(api: NativeEngineApi, config: Option<EngineConfig>) -> Result<Self, EngineError> {
        let config = config.unwrap_or_default();

        let ctx = (api.context_create)();
        if ctx.is_null() {
            return Err(EngineError::ContextCreateFailed);
        }

        (api.set_coroutine_interface)(ctx, &THREADED_COROUTINES);
        (api.set_run_speed)(ctx, config.run_speed as i32);

        Ok(Self {
            config,
            api,
            ctx,
            tests: Vec::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn live_ctx(&self) -> Result<*mut c_void, EngineError> {
        if self.ctx.is_null() {
            return Err(EngineError::ContextDestroyed);
        }
        Ok(self.ctx)
    }

    /// Register a test function under `name`. The function runs on a
    /// coroutine worker once the test is queued and the engine drives it.
    pub fn register_test<F>(&mut self, name: &str, func: F) -> Result<TestId, EngineError>
    where
        F: Fn(&TestContext) + Send + Sync + 'static,
    {
        let ctx = self.live_ctx()?;

        if self.tests.iter().any(|t| t.name() == name) {
            return Err(EngineError::DuplicateTest(name.to_string()));
        }

        let c_name =
            CString::new(name).map_err(|_| EngineError::InvalidTestName(name.to_string()))?;

        let registration = TestRegistration::new(TestId::new(), c_name, Box::new(func), ctx);
        (self.api.register_test)(ctx, registration.name_ptr(), test_trampoline, registration.as_arg());

        let id = registration.id();
        self.tests.push(registration);
        Ok(id)
    }

    /// Queue a registered test for the next run.
    pub fn queue_test(&mut self, name: &str, flags: RunFlags) -> Result<(), EngineError> {
        let ctx = self.live_ctx()?;

        let c_name =
            CString::new(name).map_err(|_| EngineError::InvalidTestName(name.to_string()))?;
        if (self.api.queue_test)(ctx, c_name.as_ptr(), flags.bits()) {
            Ok(())
        } else {
            Err(EngineError::UnknownTest(name.to_string()))
        }
    }

    /// Drive the engine for one frame. Returns `true` while tests are still
    /// queued or running.
    pub fn tick(&mut self) -> Result<bool, EngineError> {
        let ctx = self.live_ctx()?;
        Ok((self.api.tick)(ctx))
    }

    /// Run everything queued to completion, attributing all checks to
    /// `report`.
    ///
    /// The report is installed as the ambient value on this thread for the
    /// duration of the run; coroutine workers spawned by the engine inherit
    /// it from here. With `stop_on_failure` set, draining stops at the end of
    /// the first frame that recorded a failed check.
    pub fn run_blocking(&mut self, report: &Arc<TestReport>) -> Result<ReportSummary, EngineError> {
        self.live_ctx()?;

        let _scope = ReportScope::enter(report.clone());
        loop {
            if !self.tick()? {
                break;
            }
            if self.config.stop_on_failure && report.failed() > 0 {
                break;
            }
        }

        Ok(report.summary())
    }

    /// Release the native context. Any operation after this one (including a
    /// second `shutdown`) reports [`EngineError::ContextDestroyed`].
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        let ctx = self.live_ctx()?;
        (self.api.context_destroy)(ctx);
        self.ctx = ptr::null_mut();
        Ok(())
    }
}

impl Drop for UiTestEngine {
    fn drop(&mut self) {
        if !self.ctx.is_null() {
            (self.api.context_destroy)(self.ctx);
            self.ctx = ptr::null_mut();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunSpeed;
    use crate::coroutine::registry;
    use crate::engine::native::null::NULL_ENGINE;

    #[test]
    fn register_queue_run_round_trip() {
        let _slot = registry::serialize_tests();

        let mut engine = UiTestEngine::new(NULL_ENGINE, None).unwrap();
        engine
            .register_test("menu/opens", |ctx: &TestContext| {
                ctx.check("menu visible", true);
                ctx.yield_frame();
                ctx.check("first item focused", true);
            })
            .unwrap();

        engine.queue_test("menu/opens", RunFlags::empty()).unwrap();

        let report = TestReport::new("round trip");
        let summary = engine.run_blocking(&report).unwrap();

        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 0);

        engine.shutdown().unwrap();
    }

    #[test]
    fn a_two_yield_test_takes_exactly_three_ticks() {
        let _slot = registry::serialize_tests();

        let mut engine = UiTestEngine::new(NULL_ENGINE, None).unwrap();
        engine
            .register_test("yields/twice", |ctx: &TestContext| {
                ctx.yield_frame();
                ctx.yield_frame();
            })
            .unwrap();
        engine.queue_test("yields/twice", RunFlags::empty()).unwrap();

        let report = TestReport::new("ticks");
        let _scope = ReportScope::enter(report);

        assert!(engine.tick().unwrap());
        assert!(engine.tick().unwrap());
        assert!(!engine.tick().unwrap());
    }

    #[test]
    fn queueing_an_unknown_test_fails() {
        let mut engine = UiTestEngine::new(NULL_ENGINE, None).unwrap();
        let err = engine.queue_test("never/registered", RunFlags::empty());
        assert!(matches!(err, Err(EngineError::UnknownTest(_))));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut engine = UiTestEngine::new(NULL_ENGINE, None).unwrap();
        engine
            .register_test("twice", |_ctx: &TestContext| {})
            .unwrap();
        let err = engine.register_test("twice", |_ctx: &TestContext| {});
        assert!(matches!(err, Err(EngineError::DuplicateTest(_))));
    }

    #[test]
    fn names_with_interior_nul_are_rejected() {
        let mut engine = UiTestEngine::new(NULL_ENGINE, None).unwrap();
        let err = engine.register_test("bad\0name", |_ctx: &TestContext| {});
        assert!(matches!(err, Err(EngineError::InvalidTestName(_))));
    }

    #[test]
    fn operations_after_shutdown_report_a_destroyed_context() {
        let mut engine = UiTestEngine::new(NULL_ENGINE, None).unwrap();
        engine.shutdown().unwrap();

        assert!(matches!(
            engine.register_test("late", |_ctx: &TestContext| {}),
            Err(EngineError::ContextDestroyed)
        ));
        assert!(matches!(
            engine.queue_test("late", RunFlags::empty()),
            Err(EngineError::ContextDestroyed)
        ));
        assert!(matches!(engine.tick(), Err(EngineError::ContextDestroyed)));
        assert!(matches!(engine.shutdown(), Err(EngineError::ContextDestroyed)));
    }

    #[test]
    fn a_panicking_body_still_terminates_cleanly() {
        let _slot = registry::serialize_tests();

        let mut engine = UiTestEngine::new(NULL_ENGINE, None).unwrap();
        engine
            .register_test("explodes/midway", |ctx: &TestContext| {
                ctx.check("reached the body", true);
                panic!("induced failure");
            })
            .unwrap();
        engine
            .queue_test("explodes/midway", RunFlags::empty())
            .unwrap();

        let report = TestReport::new("contained");
        let summary = engine.run_blocking(&report).unwrap();

        // The check made before the panic survives; the crash itself records
        // no outcome and the run loop does not hang.
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn stop_on_failure_stops_draining_the_queue() {
        let _slot = registry::serialize_tests();

        let config = EngineConfig {
            stop_on_failure: true,
            run_speed: RunSpeed::Fast,
            ..Default::default()
        };
        let mut engine = UiTestEngine::new(NULL_ENGINE, Some(config)).unwrap();

        engine
            .register_test("first/fails", |ctx: &TestContext| {
                ctx.check("expected widget", false);
            })
            .unwrap();
        engine
            .register_test("second/never-runs", |ctx: &TestContext| {
                ctx.check("should not have run", true);
            })
            .unwrap();

        engine.queue_test("first/fails", RunFlags::empty()).unwrap();
        engine
            .queue_test("second/never-runs", RunFlags::empty())
            .unwrap();

        let report = TestReport::new("halted");
        let summary = engine.run_blocking(&report).unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed, 0);
    }
}
