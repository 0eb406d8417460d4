//! Caller-owned results - C API for reading and releasing them
//!
//! Every string or sequence a call returns belongs to the caller until it is
//! released. Releasing an already freed handle reports a stale handle
//! instead of freeing twice.

use super::session::{session, AstBridge};
use super::{copy_out, set_last_error};
use crate::errors::Result;
use crate::handle::{Handle, Native, SequenceHandle, StringHandle};

fn count_or_code(result: Result<usize>) -> i64 {
    match result {
        Ok(n) => {
            super::clear_last_error();
            n as i64
        }
        Err(e) => set_last_error(e) as i64,
    }
}

/// Byte length of a string result, or a negative error code.
///
/// # Safety
/// `bridge` must be null or a live session from `astbridge_new`.
#[no_mangle]
pub unsafe extern "C" fn astbridge_string_len(bridge: *const AstBridge, string: u64) -> i64 {
    count_or_code((|| -> Result<usize> {
        let bridge = session(bridge)?;
        let string = StringHandle::decode(Handle::from_bits(string))?;
        bridge.resources().with_string(string, str::len)
    })())
}

/// Copy a string result into `buf` (not NUL-terminated, truncated to `cap`).
/// Returns the full byte length, or a negative error code.
///
/// # Safety
/// `bridge` as for [`astbridge_string_len`]; a non-null `buf` must be valid
/// for `cap` bytes of writes.
#[no_mangle]
pub unsafe extern "C" fn astbridge_string_copy(bridge: *const AstBridge, string: u64, buf: *mut u8, cap: usize) -> i64 {
    count_or_code((|| -> Result<usize> {
        let bridge = session(bridge)?;
        let string = StringHandle::decode(Handle::from_bits(string))?;
        bridge.resources().with_string(string, |s| copy_out(s.as_bytes(), buf, cap))
    })())
}

/// Element count of a sequence result, or a negative error code.
///
/// # Safety
/// `bridge` as for [`astbridge_string_len`].
#[no_mangle]
pub unsafe extern "C" fn astbridge_sequence_len(bridge: *const AstBridge, sequence: u64) -> i64 {
    count_or_code((|| -> Result<usize> {
        let bridge = session(bridge)?;
        let sequence = SequenceHandle::decode(Handle::from_bits(sequence))?;
        bridge.resources().sequence_len(sequence)
    })())
}

/// Element `index` of a sequence result, or `0` on failure.
///
/// # Safety
/// `bridge` as for [`astbridge_string_len`].
#[no_mangle]
pub unsafe extern "C" fn astbridge_sequence_get(bridge: *const AstBridge, sequence: u64, index: usize) -> u64 {
    let result = (|| -> Result<Handle> {
        let bridge = session(bridge)?;
        let sequence = SequenceHandle::decode(Handle::from_bits(sequence))?;
        bridge.resources().sequence_get(sequence, index)
    })();
    match result {
        Ok(handle) => {
            super::clear_last_error();
            handle.to_bits()
        }
        Err(e) => {
            set_last_error(e);
            0
        }
    }
}

/// Add a reference to a string or sequence result. Returns the new count
/// or a negative error code.
///
/// # Safety
/// `bridge` as for [`astbridge_string_len`].
#[no_mangle]
pub unsafe extern "C" fn astbridge_retain(bridge: *const AstBridge, handle: u64) -> i64 {
    count_or_code((|| -> Result<usize> {
        let bridge = session(bridge)?;
        bridge.retain(Handle::from_bits(handle)).map(|n| n as usize)
    })())
}

/// Drop a reference, freeing the result at zero. Returns the remaining
/// count or a negative error code.
///
/// # Safety
/// `bridge` as for [`astbridge_string_len`].
#[no_mangle]
pub unsafe extern "C" fn astbridge_release(bridge: *const AstBridge, handle: u64) -> i64 {
    count_or_code((|| -> Result<usize> {
        let bridge = session(bridge)?;
        bridge.release(Handle::from_bits(handle)).map(|n| n as usize)
    })())
}
