//! In-memory AST backend
//!
//! A self-contained arena that plays the compiler's role behind the bridge.
//! Every object records the context it was created in; destroying a context
//! frees everything it owns, and the generations in the slot maps turn any
//! handle still held by the host into a detectable stale reference.

mod dump;
mod node;

pub use node::{
    ContextData, DumperData, ImportSourceData, ModifierFlags, Node, NodeData, Number,
    PrimitiveType, ScriptFunctionFlags, SignatureData, TokenType, ValidationData,
};

use super::{Backend, BackendError};
use crate::handle::{
    AstNode, Context, FunctionSignature, HandleKind, ImportSource, Native, RawRef, SrcDumper,
    ValidationInfo,
};
use crate::logging::{debug, info};
use crate::resources::SlotMap;
use parking_lot::RwLock;
use std::collections::HashSet;

type BackendResult<T> = std::result::Result<T, BackendError>;

/// Objects that belong to exactly one context
trait Owned {
    fn context(&self) -> Context;
}

macro_rules! owned {
    ($($ty:ty),*) => {
        $(
            impl Owned for $ty {
                #[inline]
                fn context(&self) -> Context {
                    self.context
                }
            }
        )*
    };
}

owned!(NodeData, SignatureData, ImportSourceData, DumperData, ValidationData);

pub(crate) struct Arena {
    contexts: SlotMap<ContextData>,
    nodes: SlotMap<NodeData>,
    signatures: SlotMap<SignatureData>,
    imports: SlotMap<ImportSourceData>,
    dumpers: SlotMap<DumperData>,
    validations: SlotMap<ValidationData>,
}

impl Arena {
    fn new() -> Self {
        Self {
            contexts: SlotMap::new(),
            nodes: SlotMap::new(),
            signatures: SlotMap::new(),
            imports: SlotMap::new(),
            dumpers: SlotMap::new(),
            validations: SlotMap::new(),
        }
    }

    fn check_context(&self, ctx: Context) -> BackendResult<()> {
        if self.contexts.contains(ctx.raw()) {
            Ok(())
        } else {
            Err(BackendError::UnknownContext)
        }
    }

    fn lookup<'a, T: Owned>(
        &self,
        slots: &'a SlotMap<T>,
        ctx: Context,
        raw: RawRef,
        kind: HandleKind,
    ) -> BackendResult<&'a T> {
        self.check_context(ctx)?;
        let data = slots.get(raw).ok_or(BackendError::Missing { kind })?;
        if data.context() != ctx {
            return Err(BackendError::ForeignObject { kind });
        }
        Ok(data)
    }

    fn node(&self, ctx: Context, node: AstNode) -> BackendResult<&NodeData> {
        self.lookup(&self.nodes, ctx, node.raw(), HandleKind::AstNode)
    }

    /// Node lookup without an owning-context check, for rendering.
    pub(crate) fn get_node(&self, node: AstNode) -> Option<&Node> {
        self.nodes.get(node.raw()).map(|data| &data.node)
    }

    fn check_nodes<'n>(&self, ctx: Context, nodes: impl IntoIterator<Item = &'n AstNode>) -> BackendResult<()> {
        for node in nodes {
            self.node(ctx, *node)?;
        }
        Ok(())
    }

    fn adopt(&mut self, parent: AstNode, children: &[AstNode]) {
        for child in children {
            if let Some(data) = self.nodes.get_mut(child.raw()) {
                data.parent = Some(parent);
            }
        }
    }

    /// Whether `target` is `from` or sits anywhere below it.
    fn reaches(&self, from: AstNode, target: AstNode) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(node) = self.get_node(current) {
                stack.extend(node.children());
            }
        }
        false
    }

    /// Clear the parent of children `parent` no longer holds.
    fn disown(&mut self, parent: AstNode, dropped: impl IntoIterator<Item = AstNode>) {
        for child in dropped {
            if let Some(data) = self.nodes.get_mut(child.raw()) {
                if data.parent == Some(parent) {
                    data.parent = None;
                }
            }
        }
    }

    fn insert_node(&mut self, ctx: Context, node: Node, original: Option<AstNode>) -> BackendResult<AstNode> {
        self.check_context(ctx)?;
        let children = node.children();
        self.check_nodes(ctx, &children)?;
        let raw = self.nodes.insert(NodeData { context: ctx, node, parent: None, original });
        let handle = AstNode::from_raw(raw);
        self.adopt(handle, &children);
        Ok(handle)
    }
}

pub struct MemoryBackend {
    name: String,
    arena: RwLock<Arena>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_name("memory")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into(), arena: RwLock::new(Arena::new()) }
    }

    // ------------------------------------------------------------------
    // Contexts
    // ------------------------------------------------------------------

    pub fn create_context(&self, file: &str, source: &str) -> Context {
        let raw = self.arena.write().contexts.insert(ContextData {
            file: file.to_string(),
            source: source.to_string(),
        });
        debug!(event = "context_create", file = file, index = raw.index, "context created");
        Context::from_raw(raw)
    }

    /// Free a context and every object created in it. Returns how many
    /// objects went with it.
    pub fn destroy_context(&self, ctx: Context) -> BackendResult<usize> {
        let mut arena = self.arena.write();
        let data = arena.contexts.remove(ctx.raw()).ok_or(BackendError::UnknownContext)?;

        let freed = arena.nodes.retain(|d| d.context != ctx)
            + arena.signatures.retain(|d| d.context != ctx)
            + arena.imports.retain(|d| d.context != ctx)
            + arena.dumpers.retain(|d| d.context != ctx)
            + arena.validations.retain(|d| d.context != ctx);

        info!(
            event = "context_destroy",
            file = %data.file,
            source_len = data.source.len(),
            freed = freed,
            "context destroyed"
        );
        Ok(freed)
    }

    pub fn live_nodes(&self) -> usize {
        self.arena.read().nodes.len()
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Store a new node. Its children must live in the same context and
    /// become parented to it.
    pub fn alloc_node(&self, ctx: Context, node: Node) -> BackendResult<AstNode> {
        self.arena.write().insert_node(ctx, node, None)
    }

    /// Store a replacement for `original`, remembering where it came from.
    pub fn derive_node(&self, ctx: Context, original: AstNode, node: Node) -> BackendResult<AstNode> {
        let mut arena = self.arena.write();
        arena.node(ctx, original)?;
        arena.insert_node(ctx, node, Some(original))
    }

    pub fn with_node<R>(
        &self,
        ctx: Context,
        node: AstNode,
        f: impl FnOnce(&Node) -> BackendResult<R>,
    ) -> BackendResult<R> {
        let arena = self.arena.read();
        f(&arena.node(ctx, node)?.node)
    }

    /// Mutate a node in place. The edit is applied to a copy and committed
    /// only once every child it references is known to the context and the
    /// tree stays acyclic. Children the edit drops lose their parent link.
    pub fn with_node_mut<R>(
        &self,
        ctx: Context,
        node: AstNode,
        f: impl FnOnce(&mut Node) -> BackendResult<R>,
    ) -> BackendResult<R> {
        let mut arena = self.arena.write();
        let current = &arena.node(ctx, node)?.node;
        let before = current.children();
        let mut edited = current.clone();
        let out = f(&mut edited)?;

        let children = edited.children();
        arena.check_nodes(ctx, &children)?;
        if children.iter().any(|child| arena.reaches(*child, node)) {
            return Err(BackendError::Cycle);
        }

        if let Some(data) = arena.nodes.get_mut(node.raw()) {
            data.node = edited;
        }
        let dropped: Vec<AstNode> = before.into_iter().filter(|old| !children.contains(old)).collect();
        arena.disown(node, dropped);
        arena.adopt(node, &children);
        Ok(out)
    }

    pub fn parent(&self, ctx: Context, node: AstNode) -> BackendResult<Option<AstNode>> {
        Ok(self.arena.read().node(ctx, node)?.parent)
    }

    pub fn original(&self, ctx: Context, node: AstNode) -> BackendResult<Option<AstNode>> {
        Ok(self.arena.read().node(ctx, node)?.original)
    }

    /// Render a subtree as source text.
    pub fn dump(&self, ctx: Context, node: AstNode) -> BackendResult<String> {
        let arena = self.arena.read();
        arena.node(ctx, node)?;
        Ok(dump::render(&arena, node))
    }

    // ------------------------------------------------------------------
    // Auxiliary objects
    // ------------------------------------------------------------------

    pub fn create_signature(
        &self,
        ctx: Context,
        type_params: Option<AstNode>,
        params: Vec<AstNode>,
        return_type: Option<AstNode>,
        has_receiver: bool,
    ) -> BackendResult<FunctionSignature> {
        let mut arena = self.arena.write();
        arena.check_context(ctx)?;
        arena.check_nodes(ctx, type_params.iter().chain(&params).chain(return_type.iter()))?;
        let raw = arena.signatures.insert(SignatureData {
            context: ctx,
            type_params,
            params,
            return_type,
            has_receiver,
        });
        Ok(FunctionSignature::from_raw(raw))
    }

    pub fn signature(&self, ctx: Context, sig: FunctionSignature) -> BackendResult<SignatureData> {
        let arena = self.arena.read();
        arena
            .lookup(&arena.signatures, ctx, sig.raw(), HandleKind::FunctionSignature)
            .cloned()
    }

    pub fn create_import_source(
        &self,
        ctx: Context,
        source: AstNode,
        resolved_source: AstNode,
        has_decl: bool,
    ) -> BackendResult<ImportSource> {
        let mut arena = self.arena.write();
        arena.check_nodes(ctx, [&source, &resolved_source])?;
        let raw = arena.imports.insert(ImportSourceData {
            context: ctx,
            source,
            resolved_source,
            has_decl,
        });
        Ok(ImportSource::from_raw(raw))
    }

    pub fn import_source(&self, ctx: Context, import: ImportSource) -> BackendResult<ImportSourceData> {
        let arena = self.arena.read();
        arena
            .lookup(&arena.imports, ctx, import.raw(), HandleKind::ImportSource)
            .cloned()
    }

    pub fn create_dumper(&self, ctx: Context, node: AstNode) -> BackendResult<SrcDumper> {
        let mut arena = self.arena.write();
        arena.node(ctx, node)?;
        let raw = arena.dumpers.insert(DumperData { context: ctx, node });
        Ok(SrcDumper::from_raw(raw))
    }

    /// Source text of the dumper's node as it looks now.
    pub fn dumper_output(&self, ctx: Context, dumper: SrcDumper) -> BackendResult<String> {
        let arena = self.arena.read();
        let data = arena.lookup(&arena.dumpers, ctx, dumper.raw(), HandleKind::SrcDumper)?;
        Ok(dump::render(&arena, data.node))
    }

    pub fn create_validation_info(
        &self,
        ctx: Context,
        message: String,
        line: i32,
        column: i32,
    ) -> BackendResult<ValidationInfo> {
        let mut arena = self.arena.write();
        arena.check_context(ctx)?;
        let raw = arena.validations.insert(ValidationData { context: ctx, message, line, column });
        Ok(ValidationInfo::from_raw(raw))
    }

    pub fn validation_info(&self, ctx: Context, info: ValidationInfo) -> BackendResult<ValidationData> {
        let arena = self.arena.read();
        arena
            .lookup(&arena.validations, ctx, info.raw(), HandleKind::ValidationInfo)
            .cloned()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_live(&self, kind: HandleKind, raw: RawRef) -> bool {
        let arena = self.arena.read();
        match kind {
            HandleKind::Context => arena.contexts.contains(raw),
            HandleKind::AstNode => arena.nodes.contains(raw),
            HandleKind::FunctionSignature => arena.signatures.contains(raw),
            HandleKind::ImportSource => arena.imports.contains(raw),
            HandleKind::SrcDumper => arena.dumpers.contains(raw),
            HandleKind::ValidationInfo => arena.validations.contains(raw),
            HandleKind::String | HandleKind::Sequence => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(backend: &MemoryBackend, ctx: Context, name: &str) -> AstNode {
        backend
            .alloc_node(ctx, Node::Identifier { name: name.to_string(), type_annotation: None })
            .unwrap()
    }

    #[test]
    fn test_children_are_parented() {
        let backend = MemoryBackend::new();
        let ctx = backend.create_context("a.ets", "");
        let left = ident(&backend, ctx, "a");
        let right = ident(&backend, ctx, "b");
        let bin = backend
            .alloc_node(
                ctx,
                Node::BinaryExpression { left, right, operator: TokenType::PUNCTUATOR_PLUS },
            )
            .unwrap();

        assert_eq!(backend.parent(ctx, left).unwrap(), Some(bin));
        assert_eq!(backend.parent(ctx, right).unwrap(), Some(bin));
        assert_eq!(backend.parent(ctx, bin).unwrap(), None);
    }

    #[test]
    fn test_foreign_child_rejected() {
        let backend = MemoryBackend::new();
        let first = backend.create_context("a.ets", "");
        let second = backend.create_context("b.ets", "");
        let stray = ident(&backend, first, "x");

        let err = backend
            .alloc_node(second, Node::ExpressionStatement { expression: stray })
            .unwrap_err();
        assert_eq!(err, BackendError::ForeignObject { kind: HandleKind::AstNode });
    }

    #[test]
    fn test_destroy_context_frees_objects() {
        let backend = MemoryBackend::new();
        let ctx = backend.create_context("a.ets", "let a = 1");
        let other = backend.create_context("b.ets", "");
        let node = ident(&backend, ctx, "a");
        let kept = ident(&backend, other, "b");
        backend.create_validation_info(ctx, "bad".into(), 1, 2).unwrap();
        assert_eq!(backend.live_nodes(), 2);

        assert_eq!(backend.destroy_context(ctx).unwrap(), 2);
        assert_eq!(backend.live_nodes(), 1);
        assert!(!backend.is_live(HandleKind::AstNode, node.raw()));
        assert!(!backend.is_live(HandleKind::Context, ctx.raw()));
        assert!(backend.is_live(HandleKind::AstNode, kept.raw()));
        assert_eq!(backend.destroy_context(ctx), Err(BackendError::UnknownContext));
    }

    #[test]
    fn test_derived_node_keeps_original() {
        let backend = MemoryBackend::new();
        let ctx = backend.create_context("a.ets", "");
        let old = ident(&backend, ctx, "a");
        let new = backend
            .derive_node(ctx, old, Node::Identifier { name: "b".into(), type_annotation: None })
            .unwrap();

        assert_ne!(old, new);
        assert_eq!(backend.original(ctx, new).unwrap(), Some(old));
        assert_eq!(backend.original(ctx, old).unwrap(), None);
    }

    #[test]
    fn test_failed_edit_is_not_committed() {
        let backend = MemoryBackend::new();
        let ctx = backend.create_context("a.ets", "");
        let other = backend.create_context("b.ets", "");
        let block = backend.alloc_node(ctx, Node::BlockStatement { statements: vec![] }).unwrap();
        let stray = ident(&backend, other, "x");

        let err = backend.with_node_mut(ctx, block, |node| match node {
            Node::BlockStatement { statements } => {
                statements.push(stray);
                Ok(())
            }
            other => Err(other.mismatch("BlockStatement")),
        });
        assert!(err.is_err());

        let len = backend
            .with_node(ctx, block, |node| match node {
                Node::BlockStatement { statements } => Ok(statements.len()),
                other => Err(other.mismatch("BlockStatement")),
            })
            .unwrap();
        assert_eq!(len, 0);
    }

    #[test]
    fn test_operand_cannot_be_its_own_expression() {
        let backend = MemoryBackend::new();
        let ctx = backend.create_context("a.ets", "");
        let left = ident(&backend, ctx, "a");
        let right = ident(&backend, ctx, "b");
        let bin = backend
            .alloc_node(ctx, Node::BinaryExpression { left, right, operator: TokenType::PUNCTUATOR_PLUS })
            .unwrap();

        let err = backend.with_node_mut(ctx, bin, |node| match node {
            Node::BinaryExpression { left, .. } => {
                *left = bin;
                Ok(())
            }
            other => Err(other.mismatch("BinaryExpression")),
        });
        assert_eq!(err, Err(BackendError::Cycle));
        assert_eq!(backend.parent(ctx, left).unwrap(), Some(bin));
        assert_eq!(backend.dump(ctx, bin).unwrap(), "a + b");
    }

    #[test]
    fn test_wrong_node_kind() {
        let backend = MemoryBackend::new();
        let ctx = backend.create_context("a.ets", "");
        let lit = backend.alloc_node(ctx, Node::BooleanLiteral(true)).unwrap();
        let err = backend
            .with_node(ctx, lit, |node| match node {
                Node::Identifier { name, .. } => Ok(name.clone()),
                other => Err(other.mismatch("Identifier")),
            })
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::NodeKindMismatch { expected: "Identifier", found: "BooleanLiteral" }
        );
    }
}
