//! astbridge - marshalling bridge between a foreign host runtime and a
//! native AST backend
//!
//! A host names backend objects through checked handles, calls registered
//! operations by symbol, and owns every string or sequence a call returns
//! until it releases it.

// Core modules
pub mod errors;
pub mod handle;
pub mod resources;
pub mod interop;
pub mod backend;
pub mod ops;
pub mod bridge;
pub mod config;
pub mod logging;
pub mod ffi;

// Re-export commonly used items
pub use backend::{Backend, BackendError, MemoryBackend};
pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use errors::{BridgeError, Result};
pub use handle::{
    AstNode, Context, FunctionSignature, Handle, HandleKind, ImportSource, Native, RawRef,
    SequenceHandle, SrcDumper, StringHandle, ValidationInfo,
};
pub use interop::{
    CallScope, FromWire, IntoWire, InteropStats, Manifest, Op, OperationSchema, Registry,
    WireType, WireValue, MAX_ARITY,
};
pub use resources::{ResourceStats, ResourceTable};
