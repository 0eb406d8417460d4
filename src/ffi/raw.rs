//! C-compatible argument and result slots

use crate::errors::{BridgeError, Result};
use crate::handle::{Handle, Native, SequenceHandle, StringHandle};
use crate::interop::WireValue;
use core::ffi::c_void;

/// Wire tags as seen by C callers
pub mod tag {
    pub const VOID: u8 = 0;
    pub const BOOL: u8 = 1;
    pub const I32: u8 = 2;
    pub const I64: u8 = 3;
    pub const F32: u8 = 4;
    pub const F64: u8 = 5;
    pub const HANDLE: u8 = 6;
    /// `ptr` + `len` bytes of UTF-8, borrowed for the call
    pub const STRING: u8 = 7;
    /// `ptr` + `len` handles, borrowed for the call
    pub const HANDLE_ARRAY: u8 = 8;
    /// Result only: string handle owned by the caller
    pub const OWNED_STRING: u8 = 9;
    /// Result only: sequence handle owned by the caller, `len` elements
    pub const SEQUENCE: u8 = 10;
}

/// Untagged payload; `RawArg::tag` says which field is live
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawValue {
    pub boolean: bool,
    pub i32: i32,
    pub i64: i64,
    pub f32: f32,
    pub f64: f64,
    pub handle: u64,
    pub ptr: *const c_void,
}

impl Default for RawValue {
    #[inline]
    fn default() -> Self {
        Self { handle: 0 }
    }
}

impl core::fmt::Debug for RawValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RawValue {{ ... }}")
    }
}

/// One argument or result crossing the C boundary
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawArg {
    pub tag: u8,
    pub value: RawValue,
    pub len: usize,
}

impl RawArg {
    #[inline]
    pub const fn void() -> Self {
        Self { tag: tag::VOID, value: RawValue { handle: 0 }, len: 0 }
    }

    #[inline]
    pub const fn bool(value: bool) -> Self {
        Self { tag: tag::BOOL, value: RawValue { boolean: value }, len: 0 }
    }

    #[inline]
    pub const fn i32(value: i32) -> Self {
        Self { tag: tag::I32, value: RawValue { i32: value }, len: 0 }
    }

    #[inline]
    pub const fn i64(value: i64) -> Self {
        Self { tag: tag::I64, value: RawValue { i64: value }, len: 0 }
    }

    #[inline]
    pub const fn f32(value: f32) -> Self {
        Self { tag: tag::F32, value: RawValue { f32: value }, len: 0 }
    }

    #[inline]
    pub const fn f64(value: f64) -> Self {
        Self { tag: tag::F64, value: RawValue { f64: value }, len: 0 }
    }

    #[inline]
    pub const fn handle(bits: u64) -> Self {
        Self { tag: tag::HANDLE, value: RawValue { handle: bits }, len: 0 }
    }

    /// Borrowed UTF-8 bytes; a null pointer reads as the empty string.
    #[inline]
    pub const fn string(ptr: *const u8, len: usize) -> Self {
        Self { tag: tag::STRING, value: RawValue { ptr: ptr as *const c_void }, len }
    }

    #[inline]
    pub const fn handle_array(ptr: *const u64, len: usize) -> Self {
        Self { tag: tag::HANDLE_ARRAY, value: RawValue { ptr: ptr as *const c_void }, len }
    }

    /// Copy the argument into an owned wire value.
    ///
    /// # Safety
    /// For `STRING` and `HANDLE_ARRAY`, a non-null `value.ptr` must point to
    /// `len` readable elements for the duration of the call.
    pub unsafe fn to_wire(&self) -> Result<WireValue> {
        Ok(match self.tag {
            tag::VOID => WireValue::Void,
            tag::BOOL => WireValue::Bool(self.value.boolean),
            tag::I32 => WireValue::I32(self.value.i32),
            tag::I64 => WireValue::I64(self.value.i64),
            tag::F32 => WireValue::F32(self.value.f32),
            tag::F64 => WireValue::F64(self.value.f64),
            tag::HANDLE => WireValue::Handle(Handle::from_bits(self.value.handle)),
            tag::STRING => {
                WireValue::String(borrowed_str(self.value.ptr as *const u8, self.len, "string argument")?.to_owned())
            }
            tag::HANDLE_ARRAY => {
                let ptr = self.value.ptr as *const u64;
                if ptr.is_null() {
                    if self.len > 0 {
                        return Err(BridgeError::NullPointer("handle array"));
                    }
                    WireValue::HandleArray(Vec::new())
                } else {
                    let bits = std::slice::from_raw_parts(ptr, self.len);
                    WireValue::HandleArray(bits.iter().copied().map(Handle::from_bits).collect())
                }
            }
            other => return Err(BridgeError::UnknownWireTag(other)),
        })
    }

    /// Flatten a result for the caller.
    pub fn from_wire(value: &WireValue) -> Self {
        match value {
            WireValue::Void => Self::void(),
            WireValue::Bool(v) => Self::bool(*v),
            WireValue::I32(v) => Self::i32(*v),
            WireValue::I64(v) => Self::i64(*v),
            WireValue::F32(v) => Self::f32(*v),
            WireValue::F64(v) => Self::f64(*v),
            WireValue::Handle(h) => Self::handle(h.to_bits()),
            WireValue::OwnedString(h) => Self::owned(tag::OWNED_STRING, h.handle(), 0),
            WireValue::Sequence { handle, len } => Self::owned(tag::SEQUENCE, handle.handle(), *len),
            // Input-only shapes never come back from a call
            WireValue::String(_) | WireValue::HandleArray(_) => Self::void(),
        }
    }

    #[inline]
    const fn owned(tag: u8, handle: Handle, len: usize) -> Self {
        Self { tag, value: RawValue { handle: handle.to_bits() }, len }
    }

    /// String result, if this slot holds one
    pub fn owned_string(&self) -> Option<StringHandle> {
        if self.tag != tag::OWNED_STRING {
            return None;
        }
        StringHandle::decode(Handle::from_bits(unsafe { self.value.handle })).ok()
    }

    /// Sequence result and its length, if this slot holds one
    pub fn sequence(&self) -> Option<(SequenceHandle, usize)> {
        if self.tag != tag::SEQUENCE {
            return None;
        }
        SequenceHandle::decode(Handle::from_bits(unsafe { self.value.handle }))
            .ok()
            .map(|h| (h, self.len))
    }
}

/// Borrow `len` bytes at `ptr` as UTF-8; null reads as empty.
///
/// # Safety
/// A non-null `ptr` must point to `len` readable bytes that outlive `'a`.
pub(crate) unsafe fn borrowed_str<'a>(ptr: *const u8, len: usize, what: &'static str) -> Result<&'a str> {
    if ptr.is_null() {
        return Ok("");
    }
    std::str::from_utf8(std::slice::from_raw_parts(ptr, len)).map_err(|_| BridgeError::InvalidUtf8(what))
}
