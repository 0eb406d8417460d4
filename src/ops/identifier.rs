use super::{edit, field};
use crate::backend::memory::{MemoryBackend, Node};
use crate::errors::Result;
use crate::handle::{AstNode, Context};
use crate::interop::{Op, Registry};

pub(super) fn register(r: &Registry<MemoryBackend>) -> Result<()> {
    r.register("CreateIdentifier", create_identifier)?;
    r.register("CreateIdentifier1", create_identifier1)?;
    r.register("CreateIdentifier2", create_identifier2)?;
    r.register("UpdateIdentifier1", update_identifier1)?;
    r.register("UpdateIdentifier2", update_identifier2)?;
    r.register("IdentifierName", identifier_name)?;
    r.register(Op::new("IdentifierNameConst").read_only(), identifier_name)?;
    r.register("IdentifierSetName", identifier_set_name)?;
    r.register(Op::new("IdentifierTypeAnnotationConst").read_only(), identifier_type_annotation)?;
    r.register("IsIdentifier", is_identifier)?;
    Ok(())
}

fn identifier(name: String, type_annotation: Option<AstNode>) -> Node {
    Node::Identifier { name, type_annotation }
}

fn create_identifier(b: &MemoryBackend, ctx: Context) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, identifier(String::new(), None))?)
}

fn create_identifier1(b: &MemoryBackend, ctx: Context, name: String) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, identifier(name, None))?)
}

fn create_identifier2(
    b: &MemoryBackend,
    ctx: Context,
    name: String,
    type_annotation: Option<AstNode>,
) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, identifier(name, type_annotation))?)
}

fn update_identifier1(b: &MemoryBackend, ctx: Context, original: AstNode, name: String) -> Result<AstNode> {
    Ok(b.derive_node(ctx, original, identifier(name, None))?)
}

fn update_identifier2(
    b: &MemoryBackend,
    ctx: Context,
    original: AstNode,
    name: String,
    type_annotation: Option<AstNode>,
) -> Result<AstNode> {
    Ok(b.derive_node(ctx, original, identifier(name, type_annotation))?)
}

fn identifier_name(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<String> {
    field!(b, ctx, node, Identifier { name, .. } => name.clone())
}

fn identifier_set_name(b: &MemoryBackend, ctx: Context, node: AstNode, new_name: String) -> Result<()> {
    edit(b, ctx, node, "Identifier", |n| match n {
        Node::Identifier { name, .. } => {
            *name = new_name;
            true
        }
        _ => false,
    })
}

fn identifier_type_annotation(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Option<AstNode>> {
    field!(b, ctx, node, Identifier { type_annotation, .. } => *type_annotation)
}

fn is_identifier(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<bool> {
    Ok(b.with_node(ctx, node, |n| Ok(matches!(n, Node::Identifier { .. })))?)
}
