//! Coroutine bridge: realizes the native engine's cooperative coroutine
//! model on worker threads gated by a two-party handshake.

pub mod coroutine;
pub mod handshake;
pub mod interface;
pub(crate) mod registry;
pub(crate) mod worker;

pub use coroutine::Coroutine;
pub use handshake::Handshake;
pub use interface::{
    yield_now, CoroutineBodyFn, CoroutineHandle, CoroutineInterface, CreateFn, DestroyFn, RunFn,
    YieldFn, THREADED_COROUTINES,
};
