use crate::backend::memory::MemoryBackend;
use crate::errors::Result;
use crate::handle::{AstNode, Context, ImportSource, SrcDumper, ValidationInfo};
use crate::interop::{Op, Registry};

pub(super) fn register(r: &Registry<MemoryBackend>) -> Result<()> {
    r.register("AstNodeParent", ast_node_parent)?;
    r.register(Op::new("AstNodeOriginalNodeConst").read_only(), ast_node_original)?;
    r.register(Op::new("AstNodeDumpEtsSrcConst").read_only(), ast_node_dump_ets_src)?;

    r.register("CreateSrcDumper", create_src_dumper)?;
    r.register(Op::new("SrcDumperStrConst").read_only(), src_dumper_str)?;

    r.register("CreateImportSource", create_import_source)?;
    r.register(Op::new("ImportSourceSourceConst").read_only(), import_source_source)?;
    r.register(Op::new("ImportSourceResolvedSourceConst").read_only(), import_source_resolved)?;
    r.register(Op::new("ImportSourceHasDeclConst").read_only(), import_source_has_decl)?;

    r.register("CreateValidationInfo", create_validation_info)?;
    r.register(Op::new("ValidationInfoMessageConst").read_only(), validation_info_message)?;
    r.register(Op::new("ValidationInfoFailConst").read_only(), validation_info_fail)?;
    Ok(())
}

fn ast_node_parent(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Option<AstNode>> {
    Ok(b.parent(ctx, node)?)
}

fn ast_node_original(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<Option<AstNode>> {
    Ok(b.original(ctx, node)?)
}

fn ast_node_dump_ets_src(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<String> {
    Ok(b.dump(ctx, node)?)
}

fn create_src_dumper(b: &MemoryBackend, ctx: Context, node: AstNode) -> Result<SrcDumper> {
    Ok(b.create_dumper(ctx, node)?)
}

fn src_dumper_str(b: &MemoryBackend, ctx: Context, dumper: SrcDumper) -> Result<String> {
    Ok(b.dumper_output(ctx, dumper)?)
}

fn create_import_source(
    b: &MemoryBackend,
    ctx: Context,
    source: AstNode,
    resolved_source: AstNode,
    has_decl: bool,
) -> Result<ImportSource> {
    Ok(b.create_import_source(ctx, source, resolved_source, has_decl)?)
}

fn import_source_source(b: &MemoryBackend, ctx: Context, import: ImportSource) -> Result<AstNode> {
    Ok(b.import_source(ctx, import)?.source)
}

fn import_source_resolved(b: &MemoryBackend, ctx: Context, import: ImportSource) -> Result<AstNode> {
    Ok(b.import_source(ctx, import)?.resolved_source)
}

fn import_source_has_decl(b: &MemoryBackend, ctx: Context, import: ImportSource) -> Result<bool> {
    Ok(b.import_source(ctx, import)?.has_decl)
}

fn create_validation_info(
    b: &MemoryBackend,
    ctx: Context,
    message: String,
    line: i32,
    column: i32,
) -> Result<ValidationInfo> {
    Ok(b.create_validation_info(ctx, message, line, column)?)
}

fn validation_info_message(b: &MemoryBackend, ctx: Context, info: ValidationInfo) -> Result<String> {
    Ok(b.validation_info(ctx, info)?.message)
}

/// A validation result fails when it carries a message.
fn validation_info_fail(b: &MemoryBackend, ctx: Context, info: ValidationInfo) -> Result<bool> {
    Ok(!b.validation_info(ctx, info)?.message.is_empty())
}
