//! # pluggable - Method Interception for Plugin Systems
//!
//! `pluggable` lets externally registered plugins observe, override, or add
//! methods on an object without touching the object's own code.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pluggable::prelude::*;
//! use std::sync::Arc;
//!
//! struct Discussion {
//!     core: PluggableCore,
//! }
//!
//! impl Discussion {
//!     fn save(&self, title: String) -> Result<String, BoxError> {
//!         Ok(format!("saved {title}"))
//!     }
//! }
//!
//! impl Pluggable for Discussion {
//!     fn pluggable_core(&self) -> &PluggableCore {
//!         &self.core
//!     }
//!
//!     fn methods() -> &'static MethodTable<Self> {
//!         method_table!(Discussion { method "xSave" => Discussion::save })
//!     }
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .before("Discussion", "Save", "SpamGuard", handler_fn(|subject| {
//!         subject.core().set_event_argument("checked", true);
//!         Ok(Value::Bool(true))
//!     }))
//!     .build();
//!
//! let discussion = Discussion {
//!     core: PluggableCore::with_identity("Discussion", Arc::new(registry)),
//! };
//! let saved = discussion.intercept("Save", vec!["Hello".into()])?;
//! assert_eq!(discussion.get_return("SpamGuard", "Save_Before"), Some(Value::Bool(true)));
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use pluggable_core::{
    // Errors
    ArgumentError,
    BoxError,
    // Resolution
    DispatchResolver,
    // Event arguments
    EventArguments,
    FireAs,
    FromArgument,
    // Handlers
    Handler,
    HandlerFn,
    // Registry contract
    HandlerRegistry,
    HandlerReturns,
    HandlerType,
    IntoMethod,
    MethodFn,
    MethodNames,
    // Method tables
    MethodTable,
    MethodTableBuilder,
    NoHandlers,
    Phase,
    // Objects
    Pluggable,
    PluggableCore,
    PluggableError,
    PluginReturn,
    REMOVED_GUIDANCE,
    REMOVED_METHODS,
    RESERVED_PREFIX,
    ResolvedCall,
    // Return ledger
    ReturnLedger,
    Subject,
    Value,
    check_removed,
    handler_fn,
    method_table,
};

// Standard registry
pub use pluggable_std::{HandlerEntry, RegistrationMeta, Registry, RegistryBuilder};

/// Standard handler implementations.
pub mod handlers {
    pub use pluggable_std::handlers::LoggingHandler;
}

/// Testing utilities.
pub mod testing {
    pub use pluggable_std::testing::{
        CallLog, FailingHandler, LoggedHandler, RecordingHandler, ValueHandler,
    };
}

/// Prelude module - common imports for pluggable objects.
///
/// # Usage
///
/// ```rust,ignore
/// use pluggable::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, EventArguments, FireAs, Handler, HandlerRegistry, HandlerType, MethodTable,
        Phase, Pluggable, PluggableCore, PluggableError, Registry, RegistryBuilder, Subject,
        Value, handler_fn, method_table,
    };
}
