use std::sync::{Condvar, Mutex};

/// Two-party rendezvous between the controller thread (the native engine,
/// calling through its `run` callback) and the single worker thread that
/// executes a test body.
///
/// Each side owns exactly two transitions: the controller starts or resumes
/// the worker, the worker yields or finishes. Both flags live under one mutex
/// and both sides block on the same condition variable, so control strictly
/// alternates between them.
pub struct Handshake {
    flags: Mutex<Flags>,
    cond: Condvar,
}

#[derive(Default)]
struct Flags {
    /// True while the worker is allowed to execute past its gate.
    running: bool,
    /// One-way flag, set once the test body has returned.
    terminated: bool,
}

impl Handshake {
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(Flags::default()),
            cond: Condvar::new(),
        }
    }

    /// Worker entry gate. Blocks until the controller releases the worker
    /// with the first [`request_run`](Self::request_run).
    pub fn await_start(&self) {
        let flags = self.flags.lock().unwrap();
        let _released = self.cond.wait_while(flags, |f| !f.running).unwrap();
    }

    /// Controller side: release the worker and block until it either yields
    /// or finishes.
    ///
    /// Returns `true` when the worker yielded and is still alive, `false`
    /// when the test body terminated during this call. When the body had
    /// already terminated before the call, returns `false` immediately
    /// without signaling the worker.
    pub fn request_run(&self) -> bool {
        let mut flags = self.flags.lock().unwrap();
        if flags.terminated {
            return false;
        }

        flags.running = true;
        self.cond.notify_all();

        flags = self.cond.wait_while(flags, |f| f.running).unwrap();
        !flags.terminated
    }

    /// Worker side: hand control back to the controller and block until it
    /// resumes us. This is the coroutine's suspension point.
    pub fn yield_point(&self) {
        let mut flags = self.flags.lock().unwrap();
        flags.running = false;
        self.cond.notify_all();

        let _resumed = self.cond.wait_while(flags, |f| !f.running).unwrap();
    }

    /// Worker side: mark the test body as finished and release the
    /// controller for the last time. Called exactly once per coroutine.
    pub fn finish(&self) {
        let mut flags = self.flags.lock().unwrap();
        flags.terminated = true;
        flags.running = false;
        self.cond.notify_all();
    }

    pub fn is_terminated(&self) -> bool {
        self.flags.lock().unwrap().terminated
    }
}
