//! # Handler Registry Contract
//!
//! The dispatch core does not discover, load, or index plugins. It asks an
//! injected [`HandlerRegistry`] four questions (is there an override, is
//! there a new method, which handlers run for a phase, invoke this one) and
//! records what comes back.
//!
//! A standard in-memory implementation lives in `pluggable-std`.

use crate::{error::BoxError, pluggable::Subject};
use serde_json::Value;
use std::fmt;

/// When and how a handler participates in dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Runs before the resolved body of an intercepted call.
    Before,
    /// Runs after the resolved body of an intercepted call.
    After,
    /// Runs when an event is fired directly with `fire_event`.
    General,
    /// Replaces the object's own method.
    Override,
    /// Supplies a method the object does not declare.
    New,
}

impl Phase {
    /// Suffix used for return-ledger keys (`"Render_Before"`), or `None`
    /// for general events which are keyed by the bare event name.
    pub fn ledger_suffix(self) -> Option<&'static str> {
        match self {
            Phase::Before => Some("Before"),
            Phase::After => Some("After"),
            Phase::General => None,
            Phase::Override => Some("Override"),
            Phase::New => Some("New"),
        }
    }

    /// Ledger key for a handler of this phase on `name`.
    pub fn ledger_key(self, name: &str) -> String {
        match self.ledger_suffix() {
            Some(suffix) => format!("{name}_{suffix}"),
            None => name.to_string(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Before => "Before",
            Phase::After => "After",
            Phase::General => "General",
            Phase::Override => "Override",
            Phase::New => "New",
        };
        f.write_str(name)
    }
}

/// How the most recent intercepted call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerType {
    /// The object's own method ran.
    #[default]
    Normal,
    /// An override handler replaced the object's method.
    Override,
    /// A new-method handler supplied a method the object lacks.
    New,
}

/// The value one plugin's handler returned.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginReturn {
    /// Identity of the plugin that owns the handler.
    pub plugin: String,
    /// What the handler returned.
    pub value: Value,
}

/// Aggregate result of running every handler for one key, in invocation
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerReturns {
    returns: Vec<PluginReturn>,
}

impl HandlerReturns {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin's return value.
    pub fn push(&mut self, plugin: impl Into<String>, value: Value) {
        self.returns.push(PluginReturn {
            plugin: plugin.into(),
            value,
        });
    }

    /// The value a plugin returned, matching the identity case-insensitively.
    pub fn get(&self, plugin: &str) -> Option<&Value> {
        self.returns
            .iter()
            .rev()
            .find(|r| r.plugin.eq_ignore_ascii_case(plugin))
            .map(|r| &r.value)
    }

    /// The value returned by the last handler that ran.
    pub fn last(&self) -> Option<&Value> {
        self.returns.last().map(|r| &r.value)
    }

    /// Iterate in invocation order.
    pub fn iter(&self) -> std::slice::Iter<'_, PluginReturn> {
        self.returns.iter()
    }

    /// Number of handlers that ran.
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Whether no handler ran.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

impl<'a> IntoIterator for &'a HandlerReturns {
    type Item = &'a PluginReturn;
    type IntoIter = std::slice::Iter<'a, PluginReturn>;

    fn into_iter(self) -> Self::IntoIter {
        self.returns.iter()
    }
}

/// The capability the dispatch core needs from whatever owns plugin
/// registrations.
///
/// Lookups are keyed by the object's class identity and the *reference* name
/// of the method or event. Implementations are expected to treat both as
/// case-insensitive.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `HandlerRegistry`",
    label = "missing `HandlerRegistry` implementation",
    note = "Pluggable objects need a registry to look up Before/After/Override/New handlers."
)]
pub trait HandlerRegistry: Send + Sync + 'static {
    /// Whether an override is registered for `(class, method)`.
    fn has_override(&self, class: &str, method: &str) -> bool;

    /// Invoke the override registered for `(class, method)`.
    fn call_override(
        &self,
        subject: &dyn Subject,
        class: &str,
        method: &str,
    ) -> Result<Value, BoxError>;

    /// Whether a new-method handler is registered for `(class, method)`.
    fn has_new_method(&self, class: &str, method: &str) -> bool;

    /// Invoke the new-method handler registered for `(class, method)`.
    fn call_new_method(
        &self,
        subject: &dyn Subject,
        class: &str,
        method: &str,
    ) -> Result<Value, BoxError>;

    /// Invoke every handler registered for `(class, method, phase)` in
    /// registration order and return what each plugin returned.
    ///
    /// `phase` is one of [`Phase::Before`], [`Phase::After`] or
    /// [`Phase::General`]. The first failing handler ends the chain.
    fn call_handlers(
        &self,
        subject: &dyn Subject,
        class: &str,
        method: &str,
        phase: Phase,
    ) -> Result<HandlerReturns, BoxError>;
}

/// A registry with no handlers at all.
///
/// Objects built with it behave exactly like plain objects: every call takes
/// the [`HandlerType::Normal`] path and events reach nobody.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHandlers;

impl HandlerRegistry for NoHandlers {
    fn has_override(&self, _class: &str, _method: &str) -> bool {
        false
    }

    fn call_override(
        &self,
        _subject: &dyn Subject,
        class: &str,
        method: &str,
    ) -> Result<Value, BoxError> {
        Err(format!("no override registered for `{class}.{method}`").into())
    }

    fn has_new_method(&self, _class: &str, _method: &str) -> bool {
        false
    }

    fn call_new_method(
        &self,
        _subject: &dyn Subject,
        class: &str,
        method: &str,
    ) -> Result<Value, BoxError> {
        Err(format!("no new method registered for `{class}.{method}`").into())
    }

    fn call_handlers(
        &self,
        _subject: &dyn Subject,
        _class: &str,
        _method: &str,
        _phase: Phase,
    ) -> Result<HandlerReturns, BoxError> {
        Ok(HandlerReturns::new())
    }
}
