//! # Handler
//!
//! The invocable body of a plugin registration. A handler receives the live
//! object as a [`Subject`] so it can read or rewrite the event arguments,
//! downcast to the concrete type, or dispatch further calls on it.

use crate::{error::BoxError, pluggable::Subject};
use serde_json::Value;

/// A unit of plugin behavior registered against `(class, method, phase)`.
///
/// Closures taking `&dyn Subject` implement it directly; wrap them in
/// [`handler_fn`] to have the argument and return types inferred.
///
/// # Example
///
/// ```rust,ignore
/// let handler = handler_fn(|subject| {
///     subject.core().set_event_argument("0", json!("rewritten"));
///     Ok(Value::Null)
/// });
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a plugin `Handler`",
    label = "missing `Handler` implementation",
    note = "Handlers take `&dyn Subject` and return `Result<Value, BoxError>`."
)]
pub trait Handler: Send + Sync + 'static {
    /// Run the handler against the object being dispatched on.
    fn call(&self, subject: &dyn Subject) -> Result<Value, BoxError>;
}

// Blanket impl for closures
impl<F> Handler for F
where
    F: Fn(&dyn Subject) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    fn call(&self, subject: &dyn Subject) -> Result<Value, BoxError> {
        (self)(subject)
    }
}

/// A [`Handler`] built from a closure by [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    func: F,
}

/// Wrap a closure as a [`Handler`].
pub fn handler_fn<F>(func: F) -> HandlerFn<F>
where
    F: Fn(&dyn Subject) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    HandlerFn { func }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&dyn Subject) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    fn call(&self, subject: &dyn Subject) -> Result<Value, BoxError> {
        (self.func)(subject)
    }
}
