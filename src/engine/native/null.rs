//! In-process stand-in for the native test engine.
//!
//! Implements the [`NativeEngineApi`] contract faithfully enough to exercise
//! the coroutine bridge end to end: tests registered by name, queued one at a
//! time, each driven to completion across ticks through whatever coroutine
//! interface was installed. No GUI is touched.

use std::collections::VecDeque;
use std::ffi::{c_char, c_void, CStr, CString};

use crate::coroutine::interface::{CoroutineBodyFn, CoroutineHandle, CoroutineInterface};
use crate::engine::native::NativeEngineApi;

/// API table of the null engine. Hand this to `UiTestEngine::new` in tests
/// and demos.
pub static NULL_ENGINE: NativeEngineApi = NativeEngineApi {
    context_create: null_context_create,
    context_destroy: null_context_destroy,
    set_coroutine_interface: null_set_coroutine_interface,
    set_run_speed: null_set_run_speed,
    register_test: null_register_test,
    queue_test: null_queue_test,
    tick: null_tick,
};

struct RegisteredTest {
    name: CString,
    body: CoroutineBodyFn,
    arg: *mut c_void,
}

struct NullContext {
    iface: Option<CoroutineInterface>,
    tests: Vec<RegisteredTest>,
    queue: VecDeque<usize>,
    current: Option<CoroutineHandle>,
}

extern "C" fn null_context_create() -> *mut c_void {
    let ctx = NullContext {
        iface: None,
        tests: Vec::new(),
        queue: VecDeque::new(),
        current: None,
    };
    Box::into_raw(Box::new(ctx)) as *mut c_void
}

extern "C" fn null_context_destroy(ctx: *mut c_void) {
    if ctx.is_null() {
        return;
    }
    let mut ctx = unsafe { Box::from_raw(ctx as *mut NullContext) };

    // A test still in flight is run to completion so its worker can be
    // joined; anything still queued is dropped.
    if let Some(handle) = ctx.current.take() {
        if let Some(iface) = ctx.iface {
            while (iface.run)(handle) {}
            (iface.destroy)(handle);
        }
    }
    ctx.queue.clear();
}

extern "C" fn null_set_coroutine_interface(ctx: *mut c_void, iface: *const CoroutineInterface) {
    if ctx.is_null() {
        return;
    }
    let ctx = unsafe { &mut *(ctx as *mut NullContext) };
    ctx.iface = if iface.is_null() {
        None
    } else {
        Some(unsafe { *iface })
    };
}

extern "C" fn null_set_run_speed(ctx: *mut c_void, speed: i32) {
    if ctx.is_null() {
        return;
    }
    // The null engine drives no GUI; pacing is meaningless here.
    log::debug!("NullEngine: run speed set to {speed}");
}

extern "C" fn null_register_test(
    ctx: *mut c_void,
    name: *const c_char,
    body: CoroutineBodyFn,
    arg: *mut c_void,
) {
    if ctx.is_null() || name.is_null() {
        return;
    }
    let ctx = unsafe { &mut *(ctx as *mut NullContext) };
    let name = unsafe { CStr::from_ptr(name) }.to_owned();
    ctx.tests.push(RegisteredTest { name, body, arg });
}

extern "C" fn null_queue_test(ctx: *mut c_void, name: *const c_char, _flags: u32) -> bool {
    if ctx.is_null() || name.is_null() {
        return false;
    }
    let ctx = unsafe { &mut *(ctx as *mut NullContext) };
    let wanted = unsafe { CStr::from_ptr(name) };

    match ctx.tests.iter().position(|t| t.name.as_c_str() == wanted) {
        Some(index) => {
            ctx.queue.push_back(index);
            true
        }
        None => false,
    }
}

extern "C" fn null_tick(ctx: *mut c_void) -> bool {
    if ctx.is_null() {
        return false;
    }
    let ctx = unsafe { &mut *(ctx as *mut NullContext) };
    let Some(iface) = ctx.iface else {
        return false;
    };

    if ctx.current.is_none() {
        let Some(index) = ctx.queue.pop_front() else {
            return false;
        };
        let test = &ctx.tests[index];
        let handle = (iface.create)(test.body, test.name.as_ptr(), test.arg);
        if handle.is_null() {
            log::error!(
                "NullEngine: coroutine creation failed for '{}'",
                test.name.to_string_lossy()
            );
            return !ctx.queue.is_empty();
        }
        ctx.current = Some(handle);
    }

    if let Some(handle) = ctx.current {
        if !(iface.run)(handle) {
            (iface.destroy)(handle);
            ctx.current = None;
        }
    }

    ctx.current.is_some() || !ctx.queue.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::ptr;

    #[test]
    fn queueing_an_unknown_name_is_rejected() {
        let ctx = (NULL_ENGINE.context_create)();
        let name = CString::new("missing").unwrap();

        assert!(!(NULL_ENGINE.queue_test)(ctx, name.as_ptr(), 0));

        (NULL_ENGINE.context_destroy)(ctx);
    }

    #[test]
    fn tick_without_a_coroutine_interface_is_idle() {
        extern "C" fn nop_body(_arg: *mut c_void) {}

        let ctx = (NULL_ENGINE.context_create)();
        let name = CString::new("nop").unwrap();
        (NULL_ENGINE.register_test)(ctx, name.as_ptr(), nop_body, ptr::null_mut());
        assert!((NULL_ENGINE.queue_test)(ctx, name.as_ptr(), 0));

        // No interface installed: the engine cannot start anything.
        assert!(!(NULL_ENGINE.tick)(ctx));

        (NULL_ENGINE.context_destroy)(ctx);
    }

    #[test]
    fn null_context_operations_are_safe() {
        (NULL_ENGINE.context_destroy)(ptr::null_mut());
        assert!(!(NULL_ENGINE.tick)(ptr::null_mut()));
        let name = CString::new("x").unwrap();
        assert!(!(NULL_ENGINE.queue_test)(ptr::null_mut(), name.as_ptr(), 0));
    }
}
