pub mod config;
pub mod coroutine;
pub mod engine;
pub mod errors;
pub mod ffi;
pub mod testing;

pub use config::{EngineConfig, RunFlags, RunSpeed};
pub use engine::{NativeEngineApi, UiTestEngine};
pub use errors::EngineError;
pub use testing::{TestContext, TestId, TestReport};
