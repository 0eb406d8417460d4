//! Operation schemas - the published cross-boundary signatures
//!
//! A schema is the single source of truth a host-side stub generator must
//! match: symbol name, return wire type and ordered parameter wire types.

use super::types::{WireType, WireValue};
use crate::errors::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// Most logical parameters an operation may declare, context included.
/// Wider operations bundle their parameters into an aggregate object.
pub const MAX_ARITY: usize = 13;

/// Module operations land in unless registered elsewhere
pub const DEFAULT_MODULE: &str = "es2panda";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSchema {
    pub name: String,
    pub module: String,
    pub ret: WireType,
    pub params: Vec<WireType>,
    /// Mirrors a const accessor in the backend API. Informational only.
    #[serde(default)]
    pub read_only: bool,
}

impl OperationSchema {
    pub fn new(name: impl Into<String>, ret: WireType, params: Vec<WireType>) -> Self {
        Self {
            name: name.into(),
            module: DEFAULT_MODULE.to_string(),
            ret,
            params,
            read_only: false,
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `ret|p0|p1|...`
    pub fn signature(&self) -> String {
        let mut sig = self.ret.to_string();
        for param in &self.params {
            sig.push('|');
            sig.push_str(&param.to_string());
        }
        sig
    }

    /// Reject schemas no trampoline can serve.
    pub fn validate(&self) -> Result<()> {
        if self.arity() > MAX_ARITY {
            return Err(BridgeError::ArityExceeded {
                op: self.name.clone(),
                arity: self.arity(),
                max: MAX_ARITY,
            });
        }
        if let Some(index) = self.params.iter().position(|p| !p.is_input()) {
            return Err(BridgeError::WireMismatch {
                expected: self.params[index],
                found: "output-only type in parameter list",
            }
            .at_argument(index));
        }
        if !self.ret.is_output() {
            return Err(BridgeError::WireMismatch {
                expected: self.ret,
                found: "input-only type as return",
            });
        }
        Ok(())
    }

    /// Arity and shape check ahead of unmarshaling.
    pub fn check_args(&self, args: &[WireValue]) -> Result<()> {
        if args.len() != self.arity() {
            return Err(BridgeError::ArityMismatch {
                op: self.name.clone(),
                expected: self.arity(),
                got: args.len(),
            });
        }
        for (index, (arg, ty)) in args.iter().zip(&self.params).enumerate() {
            if !arg.conforms_to(*ty) {
                return Err(BridgeError::wire_mismatch(*ty, arg).at_argument(index));
            }
        }
        Ok(())
    }
}

/// Registration options for one operation
#[derive(Debug, Clone)]
pub struct Op {
    pub(crate) name: String,
    pub(crate) module: Option<String>,
    pub(crate) read_only: bool,
}

impl Op {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), module: None, read_only: false }
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

impl From<&str> for Op {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Every schema a bridge publishes, for host stub generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub backend: String,
    pub max_arity: usize,
    pub operations: Vec<OperationSchema>,
}

impl Manifest {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BridgeError::Manifest(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BridgeError::Manifest(e.to_string()))
    }

    pub fn find(&self, name: &str) -> Option<&OperationSchema> {
        self.operations.iter().find(|op| op.name == name)
    }
}
