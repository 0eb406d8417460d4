//! Handle encoding - checked, discriminated references across the boundary
//!
//! Design: every object the host can name travels as one 64-bit `Handle`:
//!
//! ```text
//!  63      56 55                32 31                 0
//! +----------+--------------------+--------------------+
//! |   kind   |     generation     |     slot index     |
//! +----------+--------------------+--------------------+
//! ```
//!
//! The kind tag is checked on every decode, and the generation lets the owner
//! of the slot detect use after free. `0` is the null handle.

use crate::errors::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits available for a slot generation.
pub const GENERATION_BITS: u32 = 24;

/// Mask applied to generations before packing.
pub const GENERATION_MASK: u32 = (1 << GENERATION_BITS) - 1;

/// Kind tag carried in the top byte of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandleKind {
    Context = 1,
    AstNode = 2,
    FunctionSignature = 3,
    ImportSource = 4,
    SrcDumper = 5,
    ValidationInfo = 6,
    String = 16,
    Sequence = 17,
}

impl HandleKind {
    pub const ALL: [HandleKind; 8] = [
        Self::Context,
        Self::AstNode,
        Self::FunctionSignature,
        Self::ImportSource,
        Self::SrcDumper,
        Self::ValidationInfo,
        Self::String,
        Self::Sequence,
    ];

    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Context),
            2 => Some(Self::AstNode),
            3 => Some(Self::FunctionSignature),
            4 => Some(Self::ImportSource),
            5 => Some(Self::SrcDumper),
            6 => Some(Self::ValidationInfo),
            16 => Some(Self::String),
            17 => Some(Self::Sequence),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Context => "Context",
            Self::AstNode => "AstNode",
            Self::FunctionSignature => "FunctionSignature",
            Self::ImportSource => "ImportSource",
            Self::SrcDumper => "SrcDumper",
            Self::ValidationInfo => "ValidationInfo",
            Self::String => "String",
            Self::Sequence => "Sequence",
        }
    }

    /// Kinds whose storage belongs to the bridge rather than the backend.
    #[inline]
    pub const fn is_bridge_owned(self) -> bool {
        matches!(self, Self::String | Self::Sequence)
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Slot coordinates inside the arena that owns an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawRef {
    pub index: u32,
    pub generation: u32,
}

impl RawRef {
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Opaque, pointer-sized reference handed to the host
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Handle(u64);

impl Handle {
    pub const NULL: Handle = Handle(0);

    #[inline]
    pub const fn new(kind: HandleKind, raw: RawRef) -> Self {
        let generation = (raw.generation & GENERATION_MASK) as u64;
        Self(((kind.tag() as u64) << 56) | (generation << 32) | raw.index as u64)
    }

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn tag(self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// Decoded kind, `None` for null handles and unknown tags.
    #[inline]
    pub const fn kind(self) -> Option<HandleKind> {
        HandleKind::from_tag(self.tag())
    }

    #[inline]
    pub const fn raw(self) -> RawRef {
        RawRef {
            index: self.0 as u32,
            generation: ((self.0 >> 32) as u32) & GENERATION_MASK,
        }
    }

    /// Decode against the kind the call site expects.
    pub fn expect_kind(self, expected: HandleKind) -> Result<RawRef> {
        if self.is_null() {
            return Err(BridgeError::NullHandle { expected });
        }
        match self.kind() {
            Some(kind) if kind == expected => Ok(self.raw()),
            Some(kind) => Err(BridgeError::HandleKindMismatch {
                expected,
                found: kind.name().to_string(),
            }),
            None => Err(BridgeError::HandleKindMismatch {
                expected,
                found: format!("tag {}", self.tag()),
            }),
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Handle(null)");
        }
        let raw = self.raw();
        match self.kind() {
            Some(kind) => write!(f, "Handle({}#{}@{})", kind, raw.index, raw.generation),
            None => write!(f, "Handle(tag {}#{}@{})", self.tag(), raw.index, raw.generation),
        }
    }
}

/// Strongly typed handle whose kind is fixed at compile time
pub trait Native: Copy + fmt::Debug + Send + Sync + 'static {
    const KIND: HandleKind;

    fn from_raw(raw: RawRef) -> Self;

    fn raw(self) -> RawRef;

    #[inline]
    fn handle(self) -> Handle {
        Handle::new(Self::KIND, self.raw())
    }

    /// Unchecked-liveness decode; the kind tag is still verified.
    #[inline]
    fn decode(handle: Handle) -> Result<Self> {
        handle.expect_kind(Self::KIND).map(Self::from_raw)
    }
}

macro_rules! native_handles {
    ($($(#[$meta:meta])* $name:ident => $kind:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(RawRef);

            impl Native for $name {
                const KIND: HandleKind = HandleKind::$kind;

                #[inline]
                fn from_raw(raw: RawRef) -> Self {
                    Self(raw)
                }

                #[inline]
                fn raw(self) -> RawRef {
                    self.0
                }
            }

            impl From<$name> for Handle {
                #[inline]
                fn from(value: $name) -> Handle {
                    value.handle()
                }
            }
        )*
    };
}

native_handles! {
    /// Per-compilation session owned by the backend
    Context => Context;
    /// Node in the backend's AST arena
    AstNode => AstNode;
    /// Aggregate bundling function parameters past the arity ceiling
    FunctionSignature => FunctionSignature;
    ImportSource => ImportSource;
    SrcDumper => SrcDumper;
    ValidationInfo => ValidationInfo;
    /// Bridge-owned string copy
    StringHandle => String;
    /// Bridge-owned sequence of handles
    SequenceHandle => Sequence;
}
