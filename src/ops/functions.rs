use super::field;
use crate::backend::memory::{MemoryBackend, ModifierFlags, Node, PrimitiveType, ScriptFunctionFlags};
use crate::errors::Result;
use crate::handle::{AstNode, Context, FunctionSignature};
use crate::interop::{Op, Registry};

pub(super) fn register(r: &Registry<MemoryBackend>) -> Result<()> {
    r.register("CreateFunctionSignature", create_function_signature)?;
    r.register(Op::new("FunctionSignatureParamsConst").read_only(), function_signature_params)?;
    r.register(Op::new("FunctionSignatureReturnTypeConst").read_only(), function_signature_return_type)?;
    r.register(Op::new("FunctionSignatureHasReceiverConst").read_only(), function_signature_has_receiver)?;

    r.register("CreateScriptFunction", create_script_function)?;
    r.register(Op::new("ScriptFunctionParamsConst").read_only(), script_function_params)?;
    r.register(Op::new("ScriptFunctionBodyConst").read_only(), script_function_body)?;
    r.register(Op::new("ScriptFunctionReturnTypeAnnotationConst").read_only(), script_function_return_type)?;
    r.register(Op::new("ScriptFunctionFlagsConst").read_only(), script_function_flags)?;
    r.register(Op::new("ScriptFunctionModifiersConst").read_only(), script_function_modifiers)?;

    r.register("CreateETSPrimitiveType", create_ets_primitive_type)?;
    r.register(Op::new("ETSPrimitiveTypeGetPrimitiveTypeConst").read_only(), ets_primitive_type)?;
    Ok(())
}

// ============================================================================
// FunctionSignature: bundles what would not fit a flat parameter list
// ============================================================================

fn create_function_signature(
    b: &MemoryBackend,
    ctx: Context,
    type_params: Option<AstNode>,
    params: Vec<AstNode>,
    return_type: Option<AstNode>,
    has_receiver: bool,
) -> Result<FunctionSignature> {
    Ok(b.create_signature(ctx, type_params, params, return_type, has_receiver)?)
}

fn function_signature_params(b: &MemoryBackend, ctx: Context, sig: FunctionSignature) -> Result<Vec<AstNode>> {
    Ok(b.signature(ctx, sig)?.params)
}

fn function_signature_return_type(
    b: &MemoryBackend,
    ctx: Context,
    sig: FunctionSignature,
) -> Result<Option<AstNode>> {
    Ok(b.signature(ctx, sig)?.return_type)
}

fn function_signature_has_receiver(b: &MemoryBackend, ctx: Context, sig: FunctionSignature) -> Result<bool> {
    Ok(b.signature(ctx, sig)?.has_receiver)
}

// ============================================================================
// ScriptFunction
// ============================================================================

fn create_script_function(
    b: &MemoryBackend,
    ctx: Context,
    body: Option<AstNode>,
    signature: FunctionSignature,
    flags: ScriptFunctionFlags,
    modifiers: ModifierFlags,
) -> Result<AstNode> {
    let sig = b.signature(ctx, signature)?;
    let node = Node::ScriptFunction {
        body,
        type_params: sig.type_params,
        params: sig.params,
        return_type: sig.return_type,
        has_receiver: sig.has_receiver,
        flags,
        modifiers,
    };
    Ok(b.alloc_node(ctx, node)?)
}

fn script_function_params(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Vec<AstNode>> {
    field!(b, ctx, node, ScriptFunction { params, .. } => params.clone())
}

fn script_function_body(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Option<AstNode>> {
    field!(b, ctx, node, ScriptFunction { body, .. } => *body)
}

fn script_function_return_type(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Option<AstNode>> {
    field!(b, ctx, node, ScriptFunction { return_type, .. } => *return_type)
}

fn script_function_flags(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<ScriptFunctionFlags> {
    field!(b, ctx, node, ScriptFunction { flags, .. } => *flags)
}

fn script_function_modifiers(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<ModifierFlags> {
    field!(b, ctx, node, ScriptFunction { modifiers, .. } => *modifiers)
}

// ============================================================================
// ETSPrimitiveType
// ============================================================================

fn create_ets_primitive_type(b: &MemoryBackend, ctx: Context, kind: PrimitiveType) -> Result<AstNode> {
    Ok(b.alloc_node(ctx, Node::ETSPrimitiveType(kind))?)
}

fn ets_primitive_type(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<PrimitiveType> {
    field!(b, ctx, node, ETSPrimitiveType(kind) => *kind)
}
