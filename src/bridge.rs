//! The bridge session
//!
//! A `Bridge` owns everything a host talks to: the backend, the registered
//! operations and the table of strings and sequences handed out. There is no
//! process-wide accessor; hosts keep the bridge they built and pass it back
//! on every call.

use crate::backend::{Backend, MemoryBackend};
use crate::config::BridgeConfig;
use crate::errors::Result;
use crate::handle::{Handle, SequenceHandle, StringHandle};
use crate::interop::{ArgList, CallScope, InteropStats, Manifest, OperationSchema, Registry, WireValue};
use crate::logging::{self, perf};
use crate::resources::{ResourceStats, ResourceTable};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace_span;

pub struct Bridge<B: Backend> {
    backend: Arc<B>,
    registry: Registry<B>,
    resources: ResourceTable,
    config: BridgeConfig,
    calls_made: AtomicU64,
    marshaling_errors: AtomicU64,
    backend_errors: AtomicU64,
}

impl<B: Backend> Bridge<B> {
    /// Bridge with an empty registry.
    pub fn new(backend: Arc<B>, config: BridgeConfig) -> Self {
        let resources = ResourceTable::with_limits(config.resources.max_live, config.resources.report_leaks);
        Self {
            backend,
            registry: Registry::new(),
            resources,
            config,
            calls_made: AtomicU64::new(0),
            marshaling_errors: AtomicU64::new(0),
            backend_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    #[inline]
    pub fn registry(&self) -> &Registry<B> {
        &self.registry
    }

    #[inline]
    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Invoke a registered operation by symbol name.
    pub fn call(&self, name: &str, args: impl IntoIterator<Item = WireValue>) -> Result<WireValue> {
        let args: ArgList = args.into_iter().collect();
        self.calls_made.fetch_add(1, Ordering::Relaxed);

        let span = trace_span!("call", op = name);
        let _enter = span.enter();
        let _timer = (self.config.calls.time_calls || perf::enabled()).then(|| perf::track(name));

        logging::log_call(name, args.len());
        let result = self.dispatch(name, args);

        match &result {
            Ok(value) => logging::log_return(name, value.type_name()),
            Err(e) => {
                if e.is_marshaling() {
                    self.marshaling_errors.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.backend_errors.fetch_add(1, Ordering::Relaxed);
                }
                logging::log_call_error(name, e.code(), e);
            }
        }
        result
    }

    fn dispatch(&self, name: &str, args: ArgList) -> Result<WireValue> {
        let op = self.registry.get(name)?;
        op.schema().check_args(&args)?;

        let scope = CallScope::new(
            name,
            &self.resources,
            self.backend.as_ref(),
            self.config.calls.check_liveness,
        );
        (op.thunk())(self.backend.as_ref(), &scope, args)
    }

    pub fn schema(&self, name: &str) -> Result<OperationSchema> {
        self.registry.schema(name)
    }

    pub fn manifest(&self) -> Manifest {
        self.registry.manifest(self.backend.name())
    }

    pub fn stats(&self) -> InteropStats {
        InteropStats {
            calls_made: self.calls_made.load(Ordering::Relaxed),
            marshaling_errors: self.marshaling_errors.load(Ordering::Relaxed),
            backend_errors: self.backend_errors.load(Ordering::Relaxed),
        }
    }

    pub fn resource_stats(&self) -> ResourceStats {
        self.resources.stats()
    }

    // ------------------------------------------------------------------
    // Caller-owned results
    // ------------------------------------------------------------------

    pub fn string(&self, handle: StringHandle) -> Result<String> {
        self.resources.string(handle)
    }

    pub fn sequence(&self, handle: SequenceHandle) -> Result<Vec<Handle>> {
        self.resources.sequence_items(handle)
    }

    pub fn retain(&self, handle: Handle) -> Result<u32> {
        self.resources.retain(handle)
    }

    pub fn release(&self, handle: Handle) -> Result<u32> {
        self.resources.release(handle)
    }
}

impl Bridge<MemoryBackend> {
    /// Bridge over a fresh in-memory backend with the full catalog.
    pub fn memory(config: BridgeConfig) -> Result<Self> {
        Self::with_catalog(Arc::new(MemoryBackend::new()), config)
    }

    /// Bridge over `backend` with the full catalog.
    pub fn with_catalog(backend: Arc<MemoryBackend>, config: BridgeConfig) -> Result<Self> {
        let bridge = Self::new(backend, config);
        crate::ops::register_all(&bridge.registry)?;
        logging::info!(
            event = "bridge_ready",
            backend = bridge.backend.name(),
            operations = bridge.registry.len(),
            "bridge ready"
        );
        Ok(bridge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BridgeError;
    use crate::handle::{AstNode, HandleKind, Native};

    #[test]
    fn test_identifier_round_trip() {
        let bridge = Bridge::memory(BridgeConfig::default()).unwrap();
        let ctx = bridge.backend().create_context("main.ets", "");

        let node = bridge
            .call("CreateIdentifier1", [WireValue::handle(ctx), "foo".into()])
            .unwrap();
        let name = bridge.call("IdentifierNameConst", [WireValue::handle(ctx), node]).unwrap();
        let name = name.as_owned_string().unwrap();

        assert_eq!(bridge.string(name).unwrap(), "foo");
        assert_eq!(bridge.release(name.into()).unwrap(), 0);
        assert_eq!(bridge.stats().calls_made, 2);
    }

    #[test]
    fn test_unknown_operation_counts_as_marshaling_error() {
        let bridge = Bridge::memory(BridgeConfig::default()).unwrap();
        let err = bridge.call("CreateNothing", []).unwrap_err();
        assert_eq!(err, BridgeError::UnknownOperation("CreateNothing".into()));
        assert_eq!(bridge.stats().marshaling_errors, 1);
        assert_eq!(bridge.stats().backend_errors, 0);
    }

    #[test]
    fn test_backend_error_counted() {
        let bridge = Bridge::memory(BridgeConfig::default()).unwrap();
        let ctx = bridge.backend().create_context("main.ets", "");
        let lit = bridge
            .call("CreateBooleanLiteral", [WireValue::handle(ctx), true.into()])
            .unwrap();

        let err = bridge.call("IdentifierNameConst", [WireValue::handle(ctx), lit]).unwrap_err();
        assert!(!err.is_marshaling());
        assert_eq!(bridge.stats().backend_errors, 1);
    }

    #[test]
    fn test_liveness_check_can_be_disabled() {
        let mut config = BridgeConfig::default();
        config.calls.check_liveness = false;
        let bridge = Bridge::memory(config).unwrap();
        let ctx = bridge.backend().create_context("main.ets", "");
        let node = bridge
            .call("CreateIdentifier1", [WireValue::handle(ctx), "x".into()])
            .unwrap();
        let raw = node.as_handle().unwrap().raw();
        bridge.backend().destroy_context(ctx).unwrap();
        let other = bridge.backend().create_context("other.ets", "");

        // The backend still refuses, but as a backend error rather than a
        // stale handle caught during unmarshaling.
        let err = bridge
            .call("IdentifierNameConst", [WireValue::handle(other), WireValue::handle(AstNode::from_raw(raw))])
            .unwrap_err();
        assert!(matches!(err, BridgeError::Backend(_)));
    }

    #[test]
    fn test_manifest_lists_catalog() {
        let bridge = Bridge::memory(BridgeConfig::default()).unwrap();
        let manifest = bridge.manifest();
        assert_eq!(manifest.backend, "memory");
        assert_eq!(manifest.operations.len(), bridge.registry().len());

        let create = manifest.find("CreateIdentifier1").unwrap();
        assert_eq!(create.signature(), "AstNode|Context|string");
        assert!(!create.read_only);
        assert!(manifest.find("IdentifierNameConst").unwrap().read_only);
        assert_eq!(
            bridge.schema("ArrayExpressionElementsConst").unwrap().ret,
            crate::interop::WireType::Sequence(HandleKind::AstNode)
        );
    }
}
