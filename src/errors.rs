//! Error taxonomy for the bridge
//!
//! Every failure on the call path is reported as a `BridgeError` value. The C
//! ABI flattens it to a negative status code (see [`BridgeError::code`]) and
//! keeps the full value in the thread-local last-error slot.

use crate::backend::BackendError;
use crate::handle::HandleKind;
use crate::interop::WireType;
use thiserror::Error;

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("operation `{0}` is already registered")]
    DuplicateOperation(String),

    #[error("operation `{op}` declares {arity} parameters, the limit is {max}")]
    ArityExceeded { op: String, arity: usize, max: usize },

    #[error("operation `{op}` expects {expected} arguments, got {got}")]
    ArityMismatch { op: String, expected: usize, got: usize },

    #[error("expected {expected} value, found {found}")]
    WireMismatch { expected: WireType, found: &'static str },

    #[error("argument {index}: {source}")]
    Argument {
        index: usize,
        #[source]
        source: Box<BridgeError>,
    },

    #[error("handle kind mismatch: expected {expected}, found {found}")]
    HandleKindMismatch { expected: HandleKind, found: String },

    #[error("null {expected} handle")]
    NullHandle { expected: HandleKind },

    #[error("stale {kind} handle (slot {index}, generation {generation})")]
    StaleHandle { kind: HandleKind, index: u32, generation: u32 },

    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("resource limit reached: {live} live {kind} entries")]
    ResourceLimit { kind: HandleKind, live: usize },

    #[error("null pointer passed for {0}")]
    NullPointer(&'static str),

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("unknown wire tag {0}")]
    UnknownWireTag(u8),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl BridgeError {
    /// Shorthand for a wire shape mismatch against `expected`.
    pub fn wire_mismatch(expected: WireType, found: &crate::interop::WireValue) -> Self {
        Self::WireMismatch { expected, found: found.type_name() }
    }

    /// Attach the position of the offending argument.
    pub fn at_argument(self, index: usize) -> Self {
        match self {
            // Already located errors keep their innermost index
            located @ Self::Argument { .. } => located,
            other => Self::Argument { index, source: Box::new(other) },
        }
    }

    /// Strip argument positions and return the underlying error.
    pub fn root(&self) -> &BridgeError {
        match self {
            Self::Argument { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stable negative status code for the C ABI.
    pub fn code(&self) -> i32 {
        match self {
            Self::Argument { source, .. } => source.code(),
            Self::UnknownOperation(_) => -1,
            Self::DuplicateOperation(_) => -2,
            Self::ArityExceeded { .. } => -3,
            Self::ArityMismatch { .. } => -4,
            Self::WireMismatch { .. } => -5,
            Self::HandleKindMismatch { .. } => -6,
            Self::NullHandle { .. } => -7,
            Self::StaleHandle { .. } => -8,
            Self::IndexOutOfBounds { .. } => -9,
            Self::ResourceLimit { .. } => -10,
            Self::NullPointer(_) => -11,
            Self::InvalidUtf8(_) => -12,
            Self::UnknownWireTag(_) => -13,
            Self::Config(_) => -14,
            Self::Backend(_) => -15,
            Self::Manifest(_) => -16,
        }
    }

    /// Whether the failure happened while converting values, as opposed to
    /// inside the backend.
    pub fn is_marshaling(&self) -> bool {
        !matches!(self.root(), Self::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_wrapping_keeps_innermost_index() {
        let err = BridgeError::NullHandle { expected: HandleKind::AstNode }
            .at_argument(2)
            .at_argument(5);

        match &err {
            BridgeError::Argument { index, .. } => assert_eq!(*index, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.code(), -7);
        assert_eq!(err.to_string(), "argument 2: null AstNode handle");
    }

    #[test]
    fn test_code_of_nested_argument_error() {
        let inner = BridgeError::Argument {
            index: 1,
            source: Box::new(BridgeError::StaleHandle { kind: HandleKind::AstNode, index: 4, generation: 2 }),
        };
        let err = BridgeError::Argument { index: 0, source: Box::new(inner) };
        assert_eq!(err.code(), -8);
    }

    #[test]
    fn test_backend_errors_are_not_marshaling() {
        let err: BridgeError = BackendError::UnknownContext.into();
        assert!(!err.is_marshaling());
        assert_eq!(err.code(), -15);

        let err = BridgeError::UnknownOperation("Nope".into());
        assert!(err.is_marshaling());
    }
}
