//! Type marshaling - wire values <-> backend argument and result types
//!
//! Design: one trait pair instead of one converter per arity. `FromWire`
//! turns an incoming wire value into the Rust type a backend entry point
//! takes; `IntoWire` turns its result back. Both carry their wire type as an
//! associated constant, so an operation's schema is derived from its Rust
//! signature and can never drift from the thunk.
//!
//! Ownership follows the boundary contract:
//! - input strings and handle arrays arrive as owned copies and are dropped
//!   when the call returns (the backend only borrows them)
//! - output strings and handle lists are allocated fresh in the
//!   [`ResourceTable`] and owned by the caller
//! - backend handles pass through untouched

use super::types::{WireType, WireValue};
use crate::backend::Backend;
use crate::errors::{BridgeError, Result};
use crate::handle::{
    AstNode, Context, FunctionSignature, Handle, HandleKind, ImportSource, Native, RawRef,
    SrcDumper, ValidationInfo,
};
use crate::resources::ResourceTable;

/// Per-call marshaling environment
pub struct CallScope<'a> {
    op: &'a str,
    resources: &'a ResourceTable,
    backend: &'a dyn Backend,
    check_liveness: bool,
}

impl<'a> CallScope<'a> {
    pub fn new(
        op: &'a str,
        resources: &'a ResourceTable,
        backend: &'a dyn Backend,
        check_liveness: bool,
    ) -> Self {
        Self { op, resources, backend, check_liveness }
    }

    /// Name of the operation being marshaled
    #[inline]
    pub fn op(&self) -> &str {
        self.op
    }

    #[inline]
    pub fn resources(&self) -> &ResourceTable {
        self.resources
    }

    /// Decode a handle as `T`, verifying its kind and, when enabled, that
    /// its owner still holds the slot.
    pub fn decode<T: Native>(&self, handle: Handle) -> Result<T> {
        let raw = handle.expect_kind(T::KIND)?;
        self.check_live(T::KIND, handle, raw)?;
        Ok(T::from_raw(raw))
    }

    fn check_live(&self, kind: HandleKind, handle: Handle, raw: RawRef) -> Result<()> {
        if !self.check_liveness {
            return Ok(());
        }
        let live = if kind.is_bridge_owned() {
            self.resources.is_live(handle)
        } else {
            self.backend.is_live(kind, raw)
        };
        if live {
            Ok(())
        } else {
            Err(BridgeError::StaleHandle { kind, index: raw.index, generation: raw.generation })
        }
    }
}

/// Conversion from an incoming wire value
pub trait FromWire: Sized {
    const WIRE: WireType;

    fn from_wire(value: WireValue, scope: &CallScope<'_>) -> Result<Self>;
}

/// Conversion of a result into an outgoing wire value
pub trait IntoWire {
    const WIRE: WireType;

    fn into_wire(self, scope: &CallScope<'_>) -> Result<WireValue>;
}

// ============================================================================
// Scalars: single cast, no range validation
// ============================================================================

macro_rules! scalar_wire {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromWire for $ty {
                const WIRE: WireType = WireType::$variant;

                #[inline]
                fn from_wire(value: WireValue, _scope: &CallScope<'_>) -> Result<Self> {
                    match value {
                        WireValue::$variant(v) => Ok(v),
                        other => Err(BridgeError::wire_mismatch(<Self as FromWire>::WIRE, &other)),
                    }
                }
            }

            impl IntoWire for $ty {
                const WIRE: WireType = WireType::$variant;

                #[inline]
                fn into_wire(self, _scope: &CallScope<'_>) -> Result<WireValue> {
                    Ok(WireValue::$variant(self))
                }
            }
        )*
    };
}

scalar_wire! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl IntoWire for () {
    const WIRE: WireType = WireType::Void;

    #[inline]
    fn into_wire(self, _scope: &CallScope<'_>) -> Result<WireValue> {
        Ok(WireValue::Void)
    }
}

// ============================================================================
// Strings: borrowed copy in, fresh owned entry out
// ============================================================================

impl FromWire for String {
    const WIRE: WireType = WireType::String;

    fn from_wire(value: WireValue, _scope: &CallScope<'_>) -> Result<Self> {
        match value {
            WireValue::String(s) => Ok(s),
            other => Err(BridgeError::wire_mismatch(<Self as FromWire>::WIRE, &other)),
        }
    }
}

impl IntoWire for String {
    const WIRE: WireType = WireType::OwnedString;

    fn into_wire(self, scope: &CallScope<'_>) -> Result<WireValue> {
        scope.resources.alloc_string(self).map(WireValue::OwnedString)
    }
}

// ============================================================================
// Handles
// ============================================================================

macro_rules! native_wire {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromWire for $ty {
                const WIRE: WireType = WireType::Handle(<$ty as Native>::KIND);

                #[inline]
                fn from_wire(value: WireValue, scope: &CallScope<'_>) -> Result<Self> {
                    match value {
                        WireValue::Handle(handle) => scope.decode(handle),
                        other => Err(BridgeError::wire_mismatch(<Self as FromWire>::WIRE, &other)),
                    }
                }
            }

            impl IntoWire for $ty {
                const WIRE: WireType = WireType::Handle(<$ty as Native>::KIND);

                #[inline]
                fn into_wire(self, _scope: &CallScope<'_>) -> Result<WireValue> {
                    Ok(WireValue::Handle(self.handle()))
                }
            }
        )*
    };
}

native_wire!(Context, AstNode, FunctionSignature, ImportSource, SrcDumper, ValidationInfo);

/// Nullable handle: null decodes to `None`
impl<T: Native + FromWire> FromWire for Option<T> {
    const WIRE: WireType = WireType::Handle(T::KIND);

    fn from_wire(value: WireValue, scope: &CallScope<'_>) -> Result<Self> {
        match value {
            WireValue::Handle(handle) if handle.is_null() => Ok(None),
            WireValue::Handle(handle) => scope.decode(handle).map(Some),
            other => Err(BridgeError::wire_mismatch(<Self as FromWire>::WIRE, &other)),
        }
    }
}

impl<T: Native + IntoWire> IntoWire for Option<T> {
    const WIRE: WireType = WireType::Handle(T::KIND);

    fn into_wire(self, _scope: &CallScope<'_>) -> Result<WireValue> {
        Ok(WireValue::Handle(self.map_or(Handle::NULL, Native::handle)))
    }
}

/// Pointer array in: every element is decoded and checked
impl<T: Native + FromWire> FromWire for Vec<T> {
    const WIRE: WireType = WireType::HandleArray(T::KIND);

    fn from_wire(value: WireValue, scope: &CallScope<'_>) -> Result<Self> {
        match value {
            WireValue::HandleArray(items) => items.into_iter().map(|h| scope.decode(h)).collect(),
            other => Err(BridgeError::wire_mismatch(<Self as FromWire>::WIRE, &other)),
        }
    }
}

/// Child list out: boxed into a fresh sequence, order preserved
impl<T: Native + IntoWire> IntoWire for Vec<T> {
    const WIRE: WireType = WireType::Sequence(T::KIND);

    fn into_wire(self, scope: &CallScope<'_>) -> Result<WireValue> {
        let len = self.len();
        let items = self.into_iter().map(Native::handle).collect();
        let handle = scope.resources.alloc_sequence(T::KIND, items)?;
        Ok(WireValue::Sequence { handle, len })
    }
}

/// Declare an `i32`-backed enum that crosses the boundary uninterpreted.
///
/// Values outside the declared constants are carried as-is; `name()` returns
/// `None` for them.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$cmeta:meta])* const $variant:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        $vis struct $name(pub i32);

        impl $name {
            $($(#[$cmeta])* pub const $variant: Self = Self($value);)*

            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $(v if v == $value => Some(stringify!($variant)),)*
                    _ => None,
                }
            }
        }

        impl $crate::interop::FromWire for $name {
            const WIRE: $crate::interop::WireType = $crate::interop::WireType::I32;

            #[inline]
            fn from_wire(
                value: $crate::interop::WireValue,
                _scope: &$crate::interop::CallScope<'_>,
            ) -> $crate::errors::Result<Self> {
                match value {
                    $crate::interop::WireValue::I32(v) => Ok(Self(v)),
                    other => Err($crate::errors::BridgeError::wire_mismatch(
                        $crate::interop::WireType::I32,
                        &other,
                    )),
                }
            }
        }

        impl $crate::interop::IntoWire for $name {
            const WIRE: $crate::interop::WireType = $crate::interop::WireType::I32;

            #[inline]
            fn into_wire(
                self,
                _scope: &$crate::interop::CallScope<'_>,
            ) -> $crate::errors::Result<$crate::interop::WireValue> {
                Ok($crate::interop::WireValue::I32(self.0))
            }
        }
    };
}
