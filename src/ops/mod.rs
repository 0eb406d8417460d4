//! Bridged operation catalog
//!
//! Each entry point is a plain Rust function over the in-memory backend.
//! Registration derives its wire schema from the signature, so the catalog
//! below is also the published host API.
//!
//! Naming follows the host API: `Create*` factories, `Update*` replacements
//! that remember their original, accessors (the `*Const` flavour is marked
//! read-only in the schema), `*Set*` mutators and `Is*` predicates.

mod expressions;
mod functions;
mod identifier;
mod literals;
mod misc;
mod statements;

use crate::backend::memory::{MemoryBackend, Node};
use crate::errors::Result;
use crate::handle::{AstNode, Context};
use crate::interop::Registry;

/// Register the full catalog.
pub fn register_all(registry: &Registry<MemoryBackend>) -> Result<()> {
    identifier::register(registry)?;
    literals::register(registry)?;
    expressions::register(registry)?;
    statements::register(registry)?;
    functions::register(registry)?;
    misc::register(registry)?;
    Ok(())
}

/// Read from a node that must be of one kind.
fn read<R>(
    backend: &MemoryBackend,
    ctx: Context,
    node: AstNode,
    expected: &'static str,
    f: impl FnOnce(&Node) -> Option<R>,
) -> Result<R> {
    Ok(backend.with_node(ctx, node, |n| f(n).ok_or_else(|| n.mismatch(expected)))?)
}

/// Edit a node that must be of one kind.
fn edit(
    backend: &MemoryBackend,
    ctx: Context,
    node: AstNode,
    expected: &'static str,
    f: impl FnOnce(&mut Node) -> bool,
) -> Result<()> {
    Ok(backend.with_node_mut(ctx, node, |n| {
        if f(n) {
            Ok(())
        } else {
            Err(n.mismatch(expected))
        }
    })?)
}

/// `field!(backend, ctx, node, Variant { field, .. } => expr)`
macro_rules! field {
    ($backend:expr, $ctx:expr, $node:expr, $variant:ident $fields:tt => $out:expr) => {
        $crate::ops::read($backend, $ctx, $node, stringify!($variant), |n| match n {
            $crate::backend::memory::Node::$variant $fields => Some($out),
            _ => None,
        })
    };
}

pub(crate) use field;
