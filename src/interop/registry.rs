//! Operation registry - symbol name -> schema + trampoline
//!
//! Registration is the published signature. Operations are grouped by
//! module so a host can load one module's stubs at a time.

use super::call::{thunk, BridgeFn, Thunk};
use super::schema::{Manifest, Op, OperationSchema, MAX_ARITY};
use crate::errors::{BridgeError, Result};
use crate::logging::debug;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One registered operation
pub struct Operation<B> {
    schema: OperationSchema,
    thunk: Thunk<B>,
}

impl<B> Operation<B> {
    #[inline]
    pub fn schema(&self) -> &OperationSchema {
        &self.schema
    }

    #[inline]
    pub fn thunk(&self) -> &Thunk<B> {
        &self.thunk
    }
}

pub struct Registry<B> {
    ops: DashMap<String, Arc<Operation<B>>>,
}

impl<B: 'static> Registry<B> {
    pub fn new() -> Self {
        Self { ops: DashMap::new() }
    }

    /// Register a typed entry point; its schema is derived from `f`.
    pub fn register<Args, F>(&self, op: impl Into<Op>, f: F) -> Result<()>
    where
        Args: 'static,
        F: BridgeFn<B, Args>,
    {
        let op = op.into();
        let mut schema = OperationSchema::new(op.name, F::ret(), F::params().into_vec());
        schema.read_only = op.read_only;
        if let Some(module) = op.module {
            schema.module = module;
        }
        self.register_dynamic(schema, thunk(f))
    }

    /// Register a hand-built schema with a matching thunk.
    pub fn register_dynamic(&self, schema: OperationSchema, thunk: Thunk<B>) -> Result<()> {
        schema.validate()?;

        match self.ops.entry(schema.name.clone()) {
            Entry::Occupied(_) => Err(BridgeError::DuplicateOperation(schema.name)),
            Entry::Vacant(slot) => {
                debug!(
                    event = "register",
                    op = %schema.name,
                    signature = %schema.signature(),
                    "operation registered"
                );
                slot.insert(Arc::new(Operation { schema, thunk }));
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<Operation<B>>> {
        self.ops
            .get(name)
            .map(|op| Arc::clone(op.value()))
            .ok_or_else(|| BridgeError::UnknownOperation(name.to_string()))
    }

    pub fn schema(&self, name: &str) -> Result<OperationSchema> {
        self.get(name).map(|op| op.schema.clone())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operation names grouped by module, both sorted.
    pub fn modules(&self) -> BTreeMap<String, Vec<String>> {
        let mut modules: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for op in self.ops.iter() {
            modules
                .entry(op.schema.module.clone())
                .or_default()
                .push(op.schema.name.clone());
        }
        for names in modules.values_mut() {
            names.sort();
        }
        modules
    }

    /// Every schema, sorted by name.
    pub fn manifest(&self, backend: &str) -> Manifest {
        let mut operations: Vec<_> = self.ops.iter().map(|op| op.schema.clone()).collect();
        operations.sort_by(|a, b| a.name.cmp(&b.name));
        Manifest {
            backend: backend.to_string(),
            max_arity: MAX_ARITY,
            operations,
        }
    }
}

impl<B: 'static> Default for Registry<B> {
    fn default() -> Self {
        Self::new()
    }
}
