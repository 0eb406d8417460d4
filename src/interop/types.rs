//! Wire types - the small set of shapes that cross the boundary
//!
//! Every bridged operation is described purely in terms of these types.

use crate::handle::{Handle, HandleKind, SequenceHandle, StringHandle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "kind", rename_all = "snake_case")]
pub enum WireType {
    Void,
    Bool,
    I32,
    I64,
    F32,
    F64,
    /// Backend object reference, input or output
    Handle(HandleKind),
    /// Borrowed string, input only
    String,
    /// Handles plus explicit length, input only
    HandleArray(HandleKind),
    /// Freshly allocated string owned by the caller, output only
    OwnedString,
    /// Freshly allocated sequence owned by the caller, output only
    Sequence(HandleKind),
}

impl WireType {
    /// Can appear in a parameter list
    #[inline]
    pub const fn is_input(self) -> bool {
        !matches!(self, Self::Void | Self::OwnedString | Self::Sequence(_))
    }

    /// Can appear as a return type
    #[inline]
    pub const fn is_output(self) -> bool {
        !matches!(self, Self::String | Self::HandleArray(_))
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Bool => f.write_str("bool"),
            Self::I32 => f.write_str("i32"),
            Self::I64 => f.write_str("i64"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::Handle(kind) => write!(f, "{kind}"),
            Self::String => f.write_str("string"),
            Self::HandleArray(kind) => write!(f, "{kind}[]"),
            Self::OwnedString => f.write_str("string!"),
            Self::Sequence(kind) => write!(f, "{kind}[]!"),
        }
    }
}

/// A value in flight across the boundary
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Void,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Handle(Handle),
    String(String),
    HandleArray(Vec<Handle>),
    OwnedString(StringHandle),
    Sequence { handle: SequenceHandle, len: usize },
}

impl WireValue {
    /// Wrap any typed or untyped handle
    #[inline]
    pub fn handle(handle: impl Into<Handle>) -> Self {
        Self::Handle(handle.into())
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool(_) => "bool",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Handle(_) => "handle",
            Self::String(_) => "string",
            Self::HandleArray(_) => "handle array",
            Self::OwnedString(_) => "owned string",
            Self::Sequence { .. } => "sequence",
        }
    }

    /// Shape check only; handle kinds are verified during unmarshalling so
    /// the error can name the expected kind.
    pub fn conforms_to(&self, ty: WireType) -> bool {
        matches!(
            (self, ty),
            (Self::Void, WireType::Void)
                | (Self::Bool(_), WireType::Bool)
                | (Self::I32(_), WireType::I32)
                | (Self::I64(_), WireType::I64)
                | (Self::F32(_), WireType::F32)
                | (Self::F64(_), WireType::F64)
                | (Self::Handle(_), WireType::Handle(_))
                | (Self::String(_), WireType::String)
                | (Self::HandleArray(_), WireType::HandleArray(_))
                | (Self::OwnedString(_), WireType::OwnedString)
                | (Self::Sequence { .. }, WireType::Sequence(_))
        )
    }

    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            Self::Handle(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_owned_string(&self) -> Option<StringHandle> {
        match self {
            Self::OwnedString(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<(SequenceHandle, usize)> {
        match self {
            Self::Sequence { handle, len } => Some((*handle, *len)),
            _ => None,
        }
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for WireValue {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<i64> for WireValue {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<f32> for WireValue {
    fn from(value: f32) -> Self {
        Self::F32(value)
    }
}

impl From<f64> for WireValue {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<H: Into<Handle>> From<Vec<H>> for WireValue {
    fn from(value: Vec<H>) -> Self {
        Self::HandleArray(value.into_iter().map(Into::into).collect())
    }
}

impl From<Handle> for WireValue {
    fn from(value: Handle) -> Self {
        Self::Handle(value)
    }
}
