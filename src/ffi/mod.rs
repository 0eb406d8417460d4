//! C FFI - stable ABI for foreign hosts
//!
//! Design: thin `extern "C"` shims over [`Bridge`](crate::Bridge):
//! 1. Session lifecycle (new, free, contexts)
//! 2. Calls through tagged argument slots (`RawArg`)
//! 3. Caller-owned strings and sequences (read, retain, release)
//! 4. Errors as negative status codes plus a thread-local last error

mod raw;
mod resources;
mod session;

pub use raw::{tag, RawArg, RawValue};
pub use resources::{
    astbridge_release, astbridge_retain, astbridge_sequence_get, astbridge_sequence_len,
    astbridge_string_copy, astbridge_string_len,
};
pub use session::{
    astbridge_call, astbridge_context_create, astbridge_context_destroy, astbridge_free,
    astbridge_manifest, astbridge_new, astbridge_signature, AstBridge,
};

use crate::config::{BridgeConfig, CONFIG_ENV};
use crate::errors::{BridgeError, Result};
use crate::logging::{debug, info};
use std::cell::RefCell;
use std::path::PathBuf;

thread_local! {
    static LAST_ERROR: RefCell<Option<BridgeError>> = const { RefCell::new(None) };
}

/// Record `error` for this thread and return its status code.
pub(crate) fn set_last_error(error: BridgeError) -> i32 {
    let code = error.code();
    debug!(event = "ffi_error", code = code, error = %error, "error returned to host");
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(error));
    code
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Collapse a result into a status code, keeping the error.
pub(crate) fn status(result: Result<()>) -> i32 {
    match result {
        Ok(()) => {
            clear_last_error();
            0
        }
        Err(e) => set_last_error(e),
    }
}

/// Most recent error on this thread, if any
pub fn last_error() -> Option<BridgeError> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Initialize logging (idempotent). Settings come from the bridge config
/// file when one is set or discovered, `ASTBRIDGE_LOG_*` variables otherwise.
#[no_mangle]
pub extern "C" fn astbridge_init() {
    let configured = std::env::var_os(CONFIG_ENV).map(PathBuf::from).or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|dir| BridgeConfig::find_from(&dir))
    });
    match configured.map(|path| BridgeConfig::load(&path)) {
        Some(Ok(config)) => crate::logging::init_with_config(config.log.to_log_config()),
        _ => crate::logging::init(),
    }
    info!(version = env!("CARGO_PKG_VERSION"), "astbridge initialized");
}

/// Code of the last error on this thread, `0` when the last call succeeded
#[no_mangle]
pub extern "C" fn astbridge_last_error_code() -> i32 {
    LAST_ERROR.with(|slot| slot.borrow().as_ref().map_or(0, BridgeError::code))
}

/// Copy the last error message into `buf`, returning its full byte length.
/// Nothing is written when `buf` is null; the copy is truncated to `cap`.
///
/// # Safety
/// A non-null `buf` must be valid for `cap` bytes of writes.
#[no_mangle]
pub unsafe extern "C" fn astbridge_last_error_message(buf: *mut u8, cap: usize) -> usize {
    let message = LAST_ERROR.with(|slot| slot.borrow().as_ref().map(ToString::to_string));
    match message {
        Some(message) => copy_out(message.as_bytes(), buf, cap),
        None => 0,
    }
}

/// Copy up to `cap` bytes into `buf`; returns `bytes.len()`.
///
/// # Safety
/// A non-null `buf` must be valid for `cap` bytes of writes.
pub(crate) unsafe fn copy_out(bytes: &[u8], buf: *mut u8, cap: usize) -> usize {
    if !buf.is_null() {
        let n = bytes.len().min(cap);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf, n);
    }
    bytes.len()
}

#[cfg(test)]
mod tests;
