//! Testing utilities for pluggable objects.
//!
//! This module provides handlers that make dispatch easy to observe in tests.
//!
//! # Features
//!
//! - [`RecordingHandler`]: Records the event arguments it saw on every call
//! - [`ValueHandler`]: Returns a fixed value
//! - [`FailingHandler`]: Always fails with a fixed message
//! - [`CallLog`]: A shared log for checking the order handlers ran in

use parking_lot::Mutex;
use pluggable_core::{BoxError, EventArguments, Handler, Subject, Value};
use std::sync::Arc;

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records the event arguments of every call it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHandler::new();
/// let registry = RegistryBuilder::new()
///     .before("Discussion", "Save", "Spy", recorder.clone())
///     .build();
///
/// discussion.intercept("Save", vec![json!("title")])?;
/// assert_eq!(recorder.count(), 1);
/// ```
#[derive(Clone)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<EventArguments>>>,
    result: Value,
}

impl RecordingHandler {
    /// Create a recorder that returns `null`.
    pub fn new() -> Self {
        Self::returning(Value::Null)
    }

    /// Create a recorder that returns `result`.
    pub fn returning(result: Value) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            result,
        }
    }

    /// Event arguments seen on each call, oldest first.
    pub fn calls(&self) -> Vec<EventArguments> {
        self.calls.lock().clone()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl Default for RecordingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for RecordingHandler {
    fn call(&self, subject: &dyn Subject) -> Result<Value, BoxError> {
        self.calls.lock().push(subject.core().event_arguments());
        Ok(self.result.clone())
    }
}

// ============================================================================
// Fixed-result handlers
// ============================================================================

/// A handler that always returns the same value.
#[derive(Debug, Clone)]
pub struct ValueHandler {
    value: Value,
}

impl ValueHandler {
    /// Create a handler returning `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Handler for ValueHandler {
    fn call(&self, _subject: &dyn Subject) -> Result<Value, BoxError> {
        Ok(self.value.clone())
    }
}

/// A handler that always fails.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Create a handler failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Handler for FailingHandler {
    fn call(&self, _subject: &dyn Subject) -> Result<Value, BoxError> {
        Err(self.message.clone().into())
    }
}

// ============================================================================
// Call Log
// ============================================================================

/// A shared, ordered log of labels pushed by handlers.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let registry = RegistryBuilder::new()
///     .before("Doc", "Render", "A", log.handler("before"))
///     .after("Doc", "Render", "A", log.handler("after"))
///     .build();
/// // ... dispatch ...
/// assert_eq!(log.entries(), vec!["before", "after"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label.
    pub fn push(&self, label: impl Into<String>) {
        self.entries.lock().push(label.into());
    }

    /// A handler that appends `label` and returns it.
    pub fn handler(&self, label: &str) -> LoggedHandler {
        LoggedHandler {
            log: self.clone(),
            label: label.to_string(),
        }
    }

    /// Labels in the order they were pushed.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

/// Handler produced by [`CallLog::handler`].
#[derive(Debug, Clone)]
pub struct LoggedHandler {
    log: CallLog,
    label: String,
}

impl Handler for LoggedHandler {
    fn call(&self, _subject: &dyn Subject) -> Result<Value, BoxError> {
        self.log.push(self.label.clone());
        Ok(Value::String(self.label.clone()))
    }
}
