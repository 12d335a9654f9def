use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr;

use crate::config::RunFlags;
use crate::engine::native::NativeEngineApi;
use crate::engine::UiTestEngine;
use crate::testing::{TestContext, TestReport};

#[derive(Clone, Copy)]
#[repr(C)]
pub struct UiTestEngineHandle(*mut UiTestEngine);

/// C test body: called with the user pointer given at registration time.
pub type CTestFn = extern "C" fn(user: *mut c_void);

/// Raw user pointer moved into the registered closure. The C caller owns it
/// and keeps it valid for the engine lifetime.
#[derive(Clone, Copy)]
struct UserPtr(*mut c_void);

unsafe impl Send for UserPtr {}
unsafe impl Sync for UserPtr {}

#[no_mangle]
pub extern "C" fn uitest_engine_new(api: *const NativeEngineApi) -> UiTestEngineHandle {
    if api.is_null() {
        log::error!("uitest_engine_new: null api table");
        return UiTestEngineHandle(ptr::null_mut());
    }

    match UiTestEngine::new(unsafe { *api }, None) {
        Ok(engine) => UiTestEngineHandle(Box::into_raw(Box::new(engine))),
        Err(e) => {
            log::error!("uitest_engine_new: {e}");
            UiTestEngineHandle(ptr::null_mut())
        }
    }
}

#[no_mangle]
pub extern "C" fn uitest_engine_register_test(
    handle: UiTestEngineHandle,
    name: *const c_char,
    func: CTestFn,
    user: *mut c_void,
) -> bool {
    if handle.0.is_null() || name.is_null() {
        log::error!("uitest_engine_register_test: null handle or name");
        return false;
    }

    let engine = unsafe { &mut *handle.0 };
    let name = match unsafe { CStr::from_ptr(name) }.to_str() {
        Ok(name) => name,
        Err(_) => {
            log::error!("uitest_engine_register_test: name is not valid UTF-8");
            return false;
        }
    };

    let user = UserPtr(user);
    match engine.register_test(name, move |_ctx: &TestContext| {
        // Capture the whole `UserPtr` (which is `Send + Sync`) rather than its
        // raw-pointer field, so the closure satisfies the engine's bounds.
        let user = user;
        func(user.0)
    }) {
        Ok(_) => true,
        Err(e) => {
            log::error!("uitest_engine_register_test: {e}");
            false
        }
    }
}

#[no_mangle]
pub extern "C" fn uitest_engine_queue_test(
    handle: UiTestEngineHandle,
    name: *const c_char,
    flags: u32,
) -> bool {
    if handle.0.is_null() || name.is_null() {
        log::error!("uitest_engine_queue_test: null handle or name");
        return false;
    }

    let engine = unsafe { &mut *handle.0 };
    let name = match unsafe { CStr::from_ptr(name) }.to_str() {
        Ok(name) => name,
        Err(_) => {
            log::error!("uitest_engine_queue_test: name is not valid UTF-8");
            return false;
        }
    };

    match engine.queue_test(name, RunFlags::from_bits_truncate(flags)) {
        Ok(()) => true,
        Err(e) => {
            log::error!("uitest_engine_queue_test: {e}");
            false
        }
    }
}

#[no_mangle]
pub extern "C" fn uitest_engine_tick(handle: UiTestEngineHandle) -> bool {
    if handle.0.is_null() {
        log::error!("uitest_engine_tick: null handle");
        return false;
    }

    let engine = unsafe { &mut *handle.0 };
    match engine.tick() {
        Ok(busy) => busy,
        Err(e) => {
            log::error!("uitest_engine_tick: {e}");
            false
        }
    }
}

/// Run everything queued to completion and return the report as a JSON
/// string. The caller frees it with [`uitest_string_free`]. Null on error.
#[no_mangle]
pub extern "C" fn uitest_engine_run_blocking(handle: UiTestEngineHandle) -> *mut c_char {
    if handle.0.is_null() {
        log::error!("uitest_engine_run_blocking: null handle");
        return ptr::null_mut();
    }

    let engine = unsafe { &mut *handle.0 };
    let report = TestReport::new("queued tests");

    match engine.run_blocking(&report) {
        Ok(summary) => match CString::new(summary.to_json().to_string()) {
            Ok(json) => json.into_raw(),
            Err(_) => ptr::null_mut(),
        },
        Err(e) => {
            log::error!("uitest_engine_run_blocking: {e}");
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn uitest_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

#[no_mangle]
pub extern "C" fn uitest_engine_free(handle: UiTestEngineHandle) {
    if !handle.0.is_null() {
        unsafe {
            // Drop releases the native context if it is still live.
            let _ = Box::from_raw(handle.0);
        }
    }
}
