use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Outcome of a single check recorded by a test body.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub label: String,
    pub passed: bool,
}

/// Aggregate result record for one test run (or a whole queue of runs).
///
/// Reports are shared across threads: the controller installs one as the
/// ambient report, coroutine workers inherit it at spawn time, and test
/// bodies append to it while the controller is parked inside the run
/// callback.
pub struct TestReport {
    name: String,
    checks: Mutex<Vec<CheckOutcome>>,
}

impl TestReport {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            checks: Mutex::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append one check outcome.
    pub fn record(&self, label: impl Into<String>, passed: bool) {
        self.checks.lock().unwrap().push(CheckOutcome {
            label: label.into(),
            passed,
        });
    }

    pub fn passed(&self) -> usize {
        self.checks.lock().unwrap().iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.checks.lock().unwrap().iter().filter(|c| !c.passed).count()
    }

    pub fn checks(&self) -> Vec<CheckOutcome> {
        self.checks.lock().unwrap().clone()
    }

    pub fn summary(&self) -> ReportSummary {
        let checks = self.checks();
        ReportSummary {
            name: self.name.clone(),
            passed: checks.iter().filter(|c| c.passed).count(),
            failed: checks.iter().filter(|c| !c.passed).count(),
            checks,
        }
    }
}

/// Serializable snapshot of a [`TestReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub checks: Vec<CheckOutcome>,
}

impl ReportSummary {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<TestReport>>> = const { RefCell::new(None) };
}

/// The report installed on this thread, if any.
pub fn current() -> Option<Arc<TestReport>> {
    CURRENT.with(|c| c.borrow().clone())
}

/// Scoped installation of the ambient report for the current thread. The
/// previous value is restored on drop.
///
/// Thread-locals do not cross thread boundaries by themselves: whoever spawns
/// a thread that should report into the same aggregate captures [`current`]
/// first and enters a new scope inside the spawned thread (copy-on-spawn).
/// The coroutine worker does exactly that.
pub struct ReportScope {
    previous: Option<Arc<TestReport>>,
}

impl ReportScope {
    pub fn enter(report: Arc<TestReport>) -> Self {
        let previous = CURRENT.with(|c| c.borrow_mut().replace(report));
        Self { previous }
    }
}

impl Drop for ReportScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|c| *c.borrow_mut() = previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn summary_counts_passed_and_failed_checks() {
        let report = TestReport::new("counts");
        report.record("first", true);
        report.record("second", false);
        report.record("third", true);

        let summary = report.summary();
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.checks.len(), 3);

        let json = summary.to_json();
        assert_eq!(json["name"], "counts");
        assert_eq!(json["passed"], 2);
        assert_eq!(json["failed"], 1);
    }

    #[test]
    fn scope_restores_the_previous_report() {
        let outer = TestReport::new("outer");
        let inner = TestReport::new("inner");

        {
            let _outer = ReportScope::enter(outer.clone());
            {
                let _inner = ReportScope::enter(inner.clone());
                assert_eq!(current().unwrap().name(), "inner");
            }
            assert_eq!(current().unwrap().name(), "outer");
        }
        assert!(current().is_none());
    }

    #[test]
    fn copy_on_spawn_attributes_checks_to_the_same_report() {
        let report = TestReport::new("aggregate");
        let _scope = ReportScope::enter(report.clone());

        let captured = current();
        let worker = thread::spawn(move || {
            let _scope = captured.map(ReportScope::enter);
            if let Some(r) = current() {
                r.record("from worker", true);
            }
        });
        worker.join().unwrap();

        assert_eq!(report.passed(), 1);
    }

    #[test]
    fn a_fresh_thread_sees_no_ambient_report() {
        let report = TestReport::new("stays here");
        let _scope = ReportScope::enter(report);

        let seen = thread::spawn(|| current().is_some()).join().unwrap();
        assert!(!seen);
    }
}
