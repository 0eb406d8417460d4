//! Backend contract
//!
//! The bridge never reaches the compiler through a process-wide accessor.
//! A `Backend` value is handed to [`crate::Bridge`] explicitly, so its
//! lifetime belongs to whoever built the bridge and tests can run any
//! number of independent backends side by side.

pub mod memory;

use crate::handle::{HandleKind, RawRef};
use thiserror::Error;

pub use memory::MemoryBackend;

/// What the bridge needs from a backend beyond its own entry points
pub trait Backend: Send + Sync + 'static {
    /// Identifies the backend in manifests and logs
    fn name(&self) -> &str;

    /// Whether `raw` still names a live object of `kind`.
    fn is_live(&self, kind: HandleKind, raw: RawRef) -> bool;
}

/// Failures raised by backend entry points
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("expected {expected} node, found {found}")]
    NodeKindMismatch { expected: &'static str, found: &'static str },

    #[error("{kind} object belongs to another context")]
    ForeignObject { kind: HandleKind },

    #[error("unknown or destroyed context")]
    UnknownContext,

    #[error("{kind} object no longer exists")]
    Missing { kind: HandleKind },

    #[error("node cannot contain itself or one of its ancestors")]
    Cycle,
}
