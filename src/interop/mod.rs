//! Interoperability - the generic marshalling protocol
//!
//! Design: schema-driven calls through a fixed set of wire types
//!
//! Architecture:
//! - `types.rs` - wire type system (WireType, WireValue)
//! - `marshal.rs` - wire <-> Rust conversions (FromWire, IntoWire, CallScope)
//! - `schema.rs` - published operation signatures and the arity ceiling
//! - `call.rs` - arity-polymorphic trampolines (BridgeFn)
//! - `registry.rs` - symbol table of registered operations

mod types;
mod marshal;
mod schema;
mod call;
mod registry;

pub use types::{WireType, WireValue};
pub use marshal::{CallScope, FromWire, IntoWire};
pub use schema::{Manifest, Op, OperationSchema, DEFAULT_MODULE, MAX_ARITY};
pub use call::{thunk, ArgList, BridgeFn, ParamList, Thunk};
pub use registry::{Operation, Registry};

/// Interop statistics for monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteropStats {
    pub calls_made: u64,
    pub marshaling_errors: u64,
    pub backend_errors: u64,
}
