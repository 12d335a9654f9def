use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::coroutine::handshake::Handshake;

/// One live test coroutine: the handshake shared with the worker thread plus
/// exclusive ownership of the worker's join handle.
///
/// This is the value behind the opaque handle returned to the native engine
/// by the create callback.
pub struct Coroutine {
    name: String,
    handshake: Arc<Handshake>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Coroutine {
    pub(crate) fn new(name: String, handshake: Arc<Handshake>) -> Self {
        Self {
            name,
            handshake,
            worker: Mutex::new(None),
        }
    }

    /// Human-readable name given by the native engine at create time.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn handshake(&self) -> &Arc<Handshake> {
        &self.handshake
    }

    pub(crate) fn attach_worker(&self, handle: JoinHandle<()>) {
        *self.worker.lock().unwrap() = Some(handle);
    }

    /// Release the worker for one slice. See [`Handshake::request_run`].
    pub fn resume(&self) -> bool {
        self.handshake.request_run()
    }

    pub fn is_terminated(&self) -> bool {
        self.handshake.is_terminated()
    }

    /// Join the worker thread. Only sound once the handshake reports
    /// termination; the destroy callback checks that first.
    pub(crate) fn join_worker(&self) {
        let handle = self.worker.lock().unwrap().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.join() {
                log::error!("Coroutine[{}]: worker thread panicked: {:?}", self.name, e);
            }
        }
    }
}
