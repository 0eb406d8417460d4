//! Arity-polymorphic trampolines
//!
//! One generic trait replaces a family of per-arity wrappers: any
//! `Fn(&B, A0, .., An) -> Result<R>` with up to `MAX_ARITY` wire-convertible
//! parameters is a bridgeable operation. A single macro stamps out the
//! impls; each one unmarshals its arguments in order, calls the backend and
//! marshals the result.

use super::marshal::{CallScope, FromWire, IntoWire};
use super::schema::MAX_ARITY;
use super::types::{WireType, WireValue};
use crate::errors::{BridgeError, Result};
use smallvec::{smallvec, SmallVec};
use std::sync::Arc;

/// Arguments of one call, inline for the common arities
pub type ArgList = SmallVec<[WireValue; 6]>;

/// Parameter wire types of one operation
pub type ParamList = SmallVec<[WireType; 6]>;

/// Type-erased trampoline stored in the registry
pub type Thunk<B> = Arc<dyn Fn(&B, &CallScope<'_>, ArgList) -> Result<WireValue> + Send + Sync>;

/// Backend entry point callable through the fixed wire ABI
pub trait BridgeFn<B, Args>: Send + Sync + 'static {
    /// Parameter wire types, derived from the Rust signature
    fn params() -> ParamList;

    /// Return wire type, derived from the Rust signature
    fn ret() -> WireType;

    fn invoke(&self, backend: &B, scope: &CallScope<'_>, args: ArgList) -> Result<WireValue>;
}

macro_rules! impl_bridge_fn {
    ($($arg:ident),*) => {
        impl<B, F, R, $($arg,)*> BridgeFn<B, ($($arg,)*)> for F
        where
            F: Fn(&B, $($arg),*) -> Result<R> + Send + Sync + 'static,
            R: IntoWire,
            $($arg: FromWire,)*
        {
            #[inline]
            fn params() -> ParamList {
                smallvec![$($arg::WIRE),*]
            }

            #[inline]
            fn ret() -> WireType {
                R::WIRE
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn invoke(&self, backend: &B, scope: &CallScope<'_>, args: ArgList) -> Result<WireValue> {
                let got = args.len();
                let mut args = args.into_iter().enumerate();
                $(
                    let $arg = match args.next() {
                        Some((index, value)) => {
                            $arg::from_wire(value, scope).map_err(|e| e.at_argument(index))?
                        }
                        None => {
                            return Err(BridgeError::ArityMismatch {
                                op: scope.op().to_string(),
                                expected: Self::params().len(),
                                got,
                            })
                        }
                    };
                )*
                (self)(backend, $($arg),*)?.into_wire(scope)
            }
        }
    };
}

impl_bridge_fn!();
impl_bridge_fn!(A0);
impl_bridge_fn!(A0, A1);
impl_bridge_fn!(A0, A1, A2);
impl_bridge_fn!(A0, A1, A2, A3);
impl_bridge_fn!(A0, A1, A2, A3, A4);
impl_bridge_fn!(A0, A1, A2, A3, A4, A5);
impl_bridge_fn!(A0, A1, A2, A3, A4, A5, A6);
impl_bridge_fn!(A0, A1, A2, A3, A4, A5, A6, A7);
impl_bridge_fn!(A0, A1, A2, A3, A4, A5, A6, A7, A8);
impl_bridge_fn!(A0, A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_bridge_fn!(A0, A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
impl_bridge_fn!(A0, A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
impl_bridge_fn!(A0, A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);

// The impl list above stops at MAX_ARITY parameters
const _: () = assert!(MAX_ARITY == 13);

/// Erase a typed entry point into a registry thunk.
pub fn thunk<B, Args, F>(f: F) -> Thunk<B>
where
    B: 'static,
    Args: 'static,
    F: BridgeFn<B, Args>,
{
    Arc::new(move |backend: &B, scope: &CallScope<'_>, args: ArgList| f.invoke(backend, scope, args))
}
