use super::field;
use crate::backend::memory::{MemoryBackend, Node, Number};
use crate::errors::Result;
use crate::handle::{AstNode, Context};
use crate::interop::{Op, Registry};

pub(super) fn register(r: &Registry<MemoryBackend>) -> Result<()> {
    r.register("CreateNumberLiteral", create_number_literal)?;
    r.register("CreateNumberLiteral1", create_number_literal1)?;
    r.register("CreateNumberLiteral2", create_number_literal2)?;
    r.register("CreateNumberLiteral3", create_number_literal3)?;
    r.register(Op::new("NumberLiteralStrConst").read_only(), number_literal_str)?;

    r.register("CreateStringLiteral", create_string_literal)?;
    r.register("CreateStringLiteral1", create_string_literal1)?;
    r.register("UpdateStringLiteral1", update_string_literal1)?;
    r.register(Op::new("StringLiteralStrConst").read_only(), string_literal_str)?;

    r.register("CreateBooleanLiteral", create_boolean_literal)?;
    r.register(Op::new("BooleanLiteralValueConst").read_only(), boolean_literal_value)?;
    Ok(())
}

fn number(b: &MemoryBackend, ctx: Context, value: Number) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::NumberLiteral(value))?)
}

fn create_number_literal(b: &MemoryBackend, ctx: Context, value: i32) -> Result<AstNode> {
    number(b, ctx, Number::Int(value))
}

fn create_number_literal1(b: &MemoryBackend, ctx: Context, value: i64) -> Result<AstNode> {
    number(b, ctx, Number::Long(value))
}

fn create_number_literal2(b: &MemoryBackend, ctx: Context, value: f64) -> Result<AstNode> {
    number(b, ctx, Number::Double(value))
}

fn create_number_literal3(b: &MemoryBackend, ctx: Context, value: f32) -> Result<AstNode> {
    number(b, ctx, Number::Float(value))
}

fn number_literal_str(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<String> {
    field!(b, ctx, node, NumberLiteral(value) => value.to_string())
}

fn create_string_literal(b: &MemoryBackend, ctx: Context) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::StringLiteral(String::new()))?)
}

fn create_string_literal1(b: &MemoryBackend, ctx: Context, value: String) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::StringLiteral(value))?)
}

fn update_string_literal1(b: &MemoryBackend, ctx: Context, original: AstNode, value: String) -> Result<AstNode> {
    Ok(b.derive_node(ctx, original, Node::StringLiteral(value))?)
}

fn string_literal_str(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<String> {
    field!(b, ctx, node, StringLiteral(value) => value.clone())
}

fn create_boolean_literal(b: &MemoryBackend, ctx: Context, value: bool) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::BooleanLiteral(value))?)
}

fn boolean_literal_value(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<bool> {
    field!(b, ctx, node, BooleanLiteral(value) => *value)
}
