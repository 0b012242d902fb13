//! Method registry and payload dispatch.
//!
//! Payloads are parsed into envelopes, routed to the handler registered under
//! their method name, bound to that handler's calling convention, and
//! invoked synchronously. Every failure is logged and absorbed so the
//! calling listener loop keeps running.

mod arguments;
mod dispatcher;
mod errors;
mod registry;

pub use self::arguments::{Arguments, Arity, Binding};
pub(crate) use self::dispatcher::describe_panic;
pub use self::dispatcher::{DispatchOutcome, Dispatcher};
pub use self::errors::{ArityError, DispatchError, HandlerError};
pub use self::registry::{MethodHandler, MethodRegistry};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
