//! # pluggable-core
//!
//! Core traits and the call-interception protocol for pluggable objects.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins and registries that don't need the standard implementations in
//! `pluggable-std`.
//!
//! # Dispatch Protocol
//!
//! A call intercepted on a pluggable object runs in four phases:
//!
//! 1. **Resolve** ([`DispatchResolver`]) - map the requested name to a
//!    *reference name* for handler lookup and an *actual* method name,
//!    failing with [`PluggableError::UnknownMethod`] when neither a declared
//!    method nor a new-method handler exists.
//! 2. **Before** - store the arguments as [`EventArguments`] and run every
//!    Before handler. Each plugin's return value lands in the
//!    [`ReturnLedger`] under `"{reference}_Before"`.
//! 3. **Body** - an override handler if one is registered, else a
//!    new-method handler, else the object's own method. The choice is
//!    observable as [`HandlerType`].
//! 4. **After** - run every After handler, recording returns under
//!    `"{reference}_After"`. They never alter the call's result.
//!
//! Events fired with [`Subject::fire_event`] skip resolution and run the
//! general handlers for the object's identity, or for a one-shot identity
//! set with [`Subject::fire_as`].
//!
//! # Error Types
//!
//! - [`PluggableError`] - Resolution failures and handler/method failures
//! - [`ArgumentError`] - Positional argument conversion failures
//! - [`BoxError`] - What handlers and method bodies fail with

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod dispatch;
mod error;
mod handler;
mod ledger;
mod method;
mod pluggable;
mod registry;
mod resolver;

// Re-exports
pub use context::{EventArguments, FromArgument};
pub use error::{ArgumentError, BoxError, PluggableError};
pub use handler::{Handler, HandlerFn, handler_fn};
pub use ledger::ReturnLedger;
pub use method::{IntoMethod, MethodFn, MethodTable, MethodTableBuilder};
pub use pluggable::{FireAs, Pluggable, PluggableCore, Subject};
pub use registry::{HandlerRegistry, HandlerReturns, HandlerType, NoHandlers, Phase, PluginReturn};
pub use resolver::{
    DispatchResolver, MethodNames, REMOVED_GUIDANCE, REMOVED_METHODS, RESERVED_PREFIX, ResolvedCall,
    check_removed,
};
pub use serde_json::Value;
