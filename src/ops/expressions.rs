use super::{edit, field};
use crate::backend::memory::{MemoryBackend, Node, TokenType};
use crate::errors::Result;
use crate::handle::{AstNode, Context};
use crate::interop::{Op, Registry};

pub(super) fn register(r: &Registry<MemoryBackend>) -> Result<()> {
    r.register("CreateBinaryExpression", create_binary_expression)?;
    r.register("UpdateBinaryExpression", update_binary_expression)?;
    r.register("BinaryExpressionLeft", binary_expression_left)?;
    r.register(Op::new("BinaryExpressionLeftConst").read_only(), binary_expression_left)?;
    r.register("BinaryExpressionRight", binary_expression_right)?;
    r.register(Op::new("BinaryExpressionRightConst").read_only(), binary_expression_right)?;
    r.register(Op::new("BinaryExpressionOperatorTypeConst").read_only(), binary_expression_operator)?;
    r.register("BinaryExpressionSetOperator", binary_expression_set_operator)?;

    r.register("CreateArrayExpression", create_array_expression)?;
    r.register("UpdateArrayExpression", update_array_expression)?;
    r.register("ArrayExpressionElements", array_expression_elements)?;
    r.register(Op::new("ArrayExpressionElementsConst").read_only(), array_expression_elements)?;

    r.register("CreateCallExpression", create_call_expression)?;
    r.register("CallExpressionCallee", call_expression_callee)?;
    r.register(Op::new("CallExpressionCalleeConst").read_only(), call_expression_callee)?;
    r.register("CallExpressionArguments", call_expression_arguments)?;
    r.register(Op::new("CallExpressionArgumentsConst").read_only(), call_expression_arguments)?;
    r.register(Op::new("CallExpressionIsOptionalConst").read_only(), call_expression_is_optional)?;
    Ok(())
}

// ============================================================================
// BinaryExpression
// ============================================================================

fn create_binary_expression(
    b: &MemoryBackend,
    ctx: Context,
    left: AstNode,
    right: AstNode,
    operator: TokenType,
) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::BinaryExpression { left, right, operator })?)
}

fn update_binary_expression(
    b: &MemoryBackend,
    ctx: Context,
    original: AstNode,
    left: AstNode,
    right: AstNode,
    operator: TokenType,
) -> Result<AstNode> {
    Ok(b.derive_node(ctx, original, Node::BinaryExpression { left, right, operator })?)
}

fn binary_expression_left(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<AstNode> {
    field!(b, ctx, node, BinaryExpression { left, .. } => *left)
}

fn binary_expression_right(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<AstNode> {
    field!(b, ctx, node, BinaryExpression { right, .. } => *right)
}

fn binary_expression_operator(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<TokenType> {
    field!(b, ctx, node, BinaryExpression { operator, .. } => *operator)
}

fn binary_expression_set_operator(
    b: &MemoryBackend,
    ctx: Context,
    node: AstNode,
    operator_type: TokenType,
) -> Result<()> {
    edit(b, ctx, node, "BinaryExpression", |n| match n {
        Node::BinaryExpression { operator, .. } => {
            *operator = operator_type;
            true
        }
        _ => false,
    })
}

// ============================================================================
// ArrayExpression
// ============================================================================

fn create_array_expression(b: &MemoryBackend, ctx: Context, elements: Vec<AstNode>) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::ArrayExpression { elements })?)
}

fn update_array_expression(
    b: &MemoryBackend,
    ctx: Context,
    original: AstNode,
    elements: Vec<AstNode>,
) -> Result<AstNode> {
    Ok(b.derive_node(ctx, original, Node::ArrayExpression { elements })?)
}

fn array_expression_elements(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Vec<AstNode>> {
    field!(b, ctx, node, ArrayExpression { elements } => elements.clone())
}

// ============================================================================
// CallExpression
// ============================================================================

fn create_call_expression(
    b: &MemoryBackend,
    ctx: Context,
    callee: AstNode,
    arguments: Vec<AstNode>,
    type_params: Option<AstNode>,
    optional: bool,
    trailing_comma: bool,
) -> Result<AstNode> {
    let node = Node::CallExpression { callee, arguments, type_params, optional, trailing_comma };
    Ok(b.alloc_node(ctx, node)?)
}

fn call_expression_callee(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<AstNode> {
    field!(b, ctx, node, CallExpression { callee, .. } => *callee)
}

fn call_expression_arguments(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Vec<AstNode>> {
    field!(b, ctx, node, CallExpression { arguments, .. } => arguments.clone())
}

fn call_expression_is_optional(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<bool> {
    field!(b, ctx, node, CallExpression { optional, .. } => *optional)
}
