//! Session lifecycle and calls

use super::raw::{borrowed_str, RawArg};
use super::{set_last_error, status};
use crate::backend::MemoryBackend;
use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::errors::{BridgeError, Result};
use crate::handle::{Context, Handle, Native};
use crate::interop::WireValue;
use crate::logging::debug;

/// Session type behind every `astbridge_*` pointer
pub type AstBridge = Bridge<MemoryBackend>;

/// # Safety
/// `bridge` must be null or a pointer returned by [`astbridge_new`] that has
/// not been freed.
pub(crate) unsafe fn session<'a>(bridge: *const AstBridge) -> Result<&'a AstBridge> {
    bridge.as_ref().ok_or(BridgeError::NullPointer("bridge"))
}

/// Create a session over a fresh in-memory backend. Configuration comes
/// from `ASTBRIDGE_CONFIG` or a discovered `astbridge.toml`. Returns null
/// on failure.
#[no_mangle]
pub extern "C" fn astbridge_new() -> *mut AstBridge {
    match BridgeConfig::from_env().and_then(AstBridge::memory) {
        Ok(bridge) => Box::into_raw(Box::new(bridge)),
        Err(e) => {
            set_last_error(e);
            std::ptr::null_mut()
        }
    }
}

/// Destroy a session (null-safe).
///
/// # Safety
/// `bridge` must be null or come from [`astbridge_new`], and must not be
/// used afterwards.
#[no_mangle]
pub unsafe extern "C" fn astbridge_free(bridge: *mut AstBridge) {
    if bridge.is_null() {
        return;
    }
    debug!("freeing bridge session");
    drop(Box::from_raw(bridge));
}

/// Create a compilation context. Returns its handle, or `0` on failure.
///
/// # Safety
/// `bridge` as for [`astbridge_free`]; non-null strings must be valid for
/// their lengths.
#[no_mangle]
pub unsafe extern "C" fn astbridge_context_create(
    bridge: *const AstBridge,
    file: *const u8,
    file_len: usize,
    source: *const u8,
    source_len: usize,
) -> u64 {
    let result = (|| -> Result<Handle> {
        let bridge = session(bridge)?;
        let file = borrowed_str(file, file_len, "file name")?;
        let source = borrowed_str(source, source_len, "source text")?;
        Ok(bridge.backend().create_context(file, source).handle())
    })();
    handle_or_zero(result)
}

/// Destroy a context and everything created in it.
///
/// # Safety
/// `bridge` as for [`astbridge_free`].
#[no_mangle]
pub unsafe extern "C" fn astbridge_context_destroy(bridge: *const AstBridge, ctx: u64) -> i32 {
    status((|| -> Result<()> {
        let bridge = session(bridge)?;
        let ctx = Context::decode(Handle::from_bits(ctx))?;
        bridge.backend().destroy_context(ctx)?;
        Ok(())
    })())
}

/// Call the operation `name` with `argc` arguments, writing its result to
/// `out`. Returns `0` or a negative error code.
///
/// # Safety
/// `bridge` as for [`astbridge_free`]; `name` valid for `name_len` bytes;
/// `args` valid for `argc` slots (or null when `argc` is 0); every borrowed
/// pointer inside `args` valid as described on [`RawArg`]; `out` null or
/// valid for one write.
#[no_mangle]
pub unsafe extern "C" fn astbridge_call(
    bridge: *const AstBridge,
    name: *const u8,
    name_len: usize,
    args: *const RawArg,
    argc: usize,
    out: *mut RawArg,
) -> i32 {
    status((|| -> Result<()> {
        let bridge = session(bridge)?;
        let name = borrowed_str(name, name_len, "operation name")?;

        let raw_args: &[RawArg] = if args.is_null() {
            if argc > 0 {
                return Err(BridgeError::NullPointer("argument list"));
            }
            &[]
        } else {
            std::slice::from_raw_parts(args, argc)
        };
        let values = raw_args
            .iter()
            .enumerate()
            .map(|(i, arg)| arg.to_wire().map_err(|e| e.at_argument(i)))
            .collect::<Result<Vec<WireValue>>>()?;

        let result = bridge.call(name, values)?;
        match out.as_mut() {
            Some(slot) => *slot = RawArg::from_wire(&result),
            // Nowhere to hand an owned result to; free it now
            None => release_result(bridge, &result)?,
        }
        Ok(())
    })())
}

fn release_result(bridge: &AstBridge, result: &WireValue) -> Result<()> {
    match result {
        WireValue::OwnedString(h) => bridge.release(h.handle()).map(drop),
        WireValue::Sequence { handle, .. } => bridge.release(handle.handle()).map(drop),
        _ => Ok(()),
    }
}

/// Signature string `ret|p0|p1|...` of `name`, as a caller-owned string
/// handle. Returns `0` on failure.
///
/// # Safety
/// `bridge` as for [`astbridge_free`]; `name` valid for `name_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn astbridge_signature(bridge: *const AstBridge, name: *const u8, name_len: usize) -> u64 {
    let result = (|| -> Result<Handle> {
        let bridge = session(bridge)?;
        let name = borrowed_str(name, name_len, "operation name")?;
        let signature = bridge.schema(name)?.signature();
        Ok(bridge.resources().alloc_string(signature)?.handle())
    })();
    handle_or_zero(result)
}

/// JSON manifest of every registered operation, as a caller-owned string
/// handle. Returns `0` on failure.
///
/// # Safety
/// `bridge` as for [`astbridge_free`].
#[no_mangle]
pub unsafe extern "C" fn astbridge_manifest(bridge: *const AstBridge) -> u64 {
    let result = (|| -> Result<Handle> {
        let bridge = session(bridge)?;
        let json = bridge.manifest().to_json()?;
        Ok(bridge.resources().alloc_string(json)?.handle())
    })();
    handle_or_zero(result)
}

fn handle_or_zero(result: Result<Handle>) -> u64 {
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
