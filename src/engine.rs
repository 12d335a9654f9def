pub mod engine;
pub mod native;

pub use engine::UiTestEngine;
pub use native::NativeEngineApi;
