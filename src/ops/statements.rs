use super::{edit, field};
use crate::backend::memory::{MemoryBackend, Node};
use crate::errors::Result;
use crate::handle::{AstNode, Context};
use crate::interop::{Op, Registry};

pub(super) fn register(r: &Registry<MemoryBackend>) -> Result<()> {
    r.register("CreateExpressionStatement", create_expression_statement)?;
    r.register(Op::new("ExpressionStatementGetExpressionConst").read_only(), expression_statement_expression)?;

    r.register("CreateBlockStatement", create_block_statement)?;
    r.register("UpdateBlockStatement", update_block_statement)?;
    r.register("BlockStatementStatements", block_statement_statements)?;
    r.register(Op::new("BlockStatementStatementsConst").read_only(), block_statement_statements)?;
    r.register("BlockStatementSetStatements", block_statement_set_statements)?;

    r.register("CreateReturnStatement", create_return_statement)?;
    r.register("CreateReturnStatement1", create_return_statement1)?;
    r.register(Op::new("ReturnStatementArgumentConst").read_only(), return_statement_argument)?;
    Ok(())
}

fn create_expression_statement(b: &MemoryBackend, ctx: Context, expression: AstNode) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::ExpressionStatement { expression })?)
}

fn expression_statement_expression(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<AstNode> {
    field!(b, ctx, node, ExpressionStatement { expression } => *expression)
}

fn create_block_statement(b: &MemoryBackend, ctx: Context, statements: Vec<AstNode>) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::BlockStatement { statements })?)
}

fn update_block_statement(
    b: &MemoryBackend,
    ctx: Context,
    original: AstNode,
    statements: Vec<AstNode>,
) -> Result<AstNode> {
    Ok(b.derive_node(ctx, original, Node::BlockStatement { statements })?)
}

fn block_statement_statements(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Vec<AstNode>> {
    field!(b, ctx, node, BlockStatement { statements } => statements.clone())
}

fn block_statement_set_statements(
    b: &MemoryBackend,
    ctx: Context,
    node: AstNode,
    statement_list: Vec<AstNode>,
) -> Result<()> {
    edit(b, ctx, node, "BlockStatement", |n| match n {
        Node::BlockStatement { statements } => {
            *statements = statement_list;
            true
        }
        _ => false,
    })
}

fn create_return_statement(b: &MemoryBackend, ctx: Context) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::ReturnStatement { argument: None })?)
}

fn create_return_statement1(b: &MemoryBackend, ctx: Context, argument: AstNode) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::ReturnStatement { argument: Some(argument) })?)
}

fn return_statement_argument(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Option<AstNode>> {
    field!(b, ctx, node, ReturnStatement { argument } => *argument)
}
