//! Error types for pluggable dispatch.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`PluggableError`] - Every failure the interception protocol can report
//! - [`ArgumentError`] - A positional argument that did not fit a typed parameter
//!
//! Absence of a plugin return value is not an error; see
//! [`ReturnLedger`](crate::ReturnLedger).

use crate::registry::Phase;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
///
/// Handlers and method bodies fail with this type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all dispatch operations.
///
/// None of these are transient: resolution errors point at a programming or
/// configuration defect, and handler/method failures end the dispatch chain.
#[derive(Error, Debug)]
pub enum PluggableError {
    /// An event was fired (or a call intercepted) before the object's identity
    /// was established.
    #[error("event fired before the object's class identity was established")]
    NotInitialized,

    /// The identity was already established and cannot change.
    #[error("class identity already established as `{current}`")]
    IdentityAlreadyEstablished {
        /// The identity currently in place.
        current: String,
    },

    /// Neither a declared method nor a "new method" handler resolves the name.
    #[error("the `{class}` object does not have a `{method}` method")]
    UnknownMethod {
        /// Identity of the object the call was made on.
        class: String,
        /// The actual method name that was looked for.
        method: String,
    },

    /// The call targets a method that belonged to a retired capability.
    #[error("`{method}` has been removed: {guidance}")]
    RemovedCapability {
        /// The requested method name.
        method: String,
        /// What to do instead.
        guidance: &'static str,
    },

    /// A registered handler failed.
    #[error("{phase} handler for `{class}.{method}` failed")]
    Handler {
        /// Identity the handlers were looked up under.
        class: String,
        /// Reference (or event) name the handlers were looked up under.
        method: String,
        /// Phase that was being dispatched.
        phase: Phase,
        /// The handler's own error.
        #[source]
        source: BoxError,
    },

    /// The object's own method body failed.
    #[error("method `{method}` failed")]
    Method {
        /// Actual method name that was invoked.
        method: String,
        /// The method's own error.
        #[source]
        source: BoxError,
    },
}

impl PluggableError {
    /// Returns `true` for errors raised while resolving the call, before any
    /// handler or method body ran.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            PluggableError::NotInitialized
                | PluggableError::UnknownMethod { .. }
                | PluggableError::RemovedCapability { .. }
        )
    }
}

/// Error returned when a positional argument cannot be converted into the
/// parameter type a method declares.
#[derive(Error, Debug)]
#[error("argument {index} could not be read: {source}")]
pub struct ArgumentError {
    index: usize,
    #[source]
    source: serde_json::Error,
}

impl ArgumentError {
    /// Create a new argument error for the given position.
    pub fn new(index: usize, source: serde_json::Error) -> Self {
        Self { index, source }
    }

    /// Position of the offending argument.
    pub fn index(&self) -> usize {
        self.index
    }
}
