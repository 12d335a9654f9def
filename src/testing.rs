//! Test-facing surface: reports, contexts, and the invocation shim that
//! carries user test functions across the native callback boundary.

pub mod context;
pub mod report;
pub mod shim;

pub use context::{with_current, TestContext};
pub use report::{CheckOutcome, ReportSummary, TestReport};
pub use shim::{test_trampoline, TestRegistration};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a registered test, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestId(Uuid);

impl TestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for TestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for TestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
