//! Logging Handler - Observability for plugin handlers.

use pluggable_core::{BoxError, Handler, Subject, Value};

/// A Handler wrapper that logs each invocation of the inner handler.
///
/// The log line carries the owning plugin (when built with
/// [`for_plugin`](Self::for_plugin)), the wrapper's name and the identity of
/// the object being dispatched on. Logging is emitted through `tracing` when the
/// feature is enabled and is a no-op otherwise.
///
/// # Example
///
/// ```rust,ignore
/// let registry = RegistryBuilder::new()
///     .before("Discussion", "Save", "SpamGuard", LoggingHandler::for_plugin(spam_check, "SpamGuard"))
///     .build();
/// ```
pub struct LoggingHandler<H> {
    inner: H,
    name: &'static str,
    plugin: Option<String>,
}

impl<H> LoggingHandler<H> {
    /// Wrap a handler under a default name.
    pub fn new(inner: H) -> Self {
        Self::named(inner, "handler")
    }

    /// Wrap a handler under a custom name.
    pub fn named(inner: H, name: &'static str) -> Self {
        Self {
            inner,
            name,
            plugin: None,
        }
    }

    /// Wrap a handler owned by `plugin`, logged under the plugin's identity.
    pub fn for_plugin(inner: H, plugin: impl Into<String>) -> Self {
        Self {
            plugin: Some(plugin.into()),
            ..Self::new(inner)
        }
    }

    /// Identity of the owning plugin, if known.
    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    /// The name used in log lines.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<H: Handler> Handler for LoggingHandler<H> {
    fn call(&self, subject: &dyn Subject) -> Result<Value, BoxError> {
        #[cfg(feature = "tracing")]
        let class = subject.core().identity().unwrap_or("<uninitialized>").to_string();
        #[cfg(feature = "tracing")]
        let plugin = self.plugin().unwrap_or("<unknown>");

        #[cfg(feature = "tracing")]
        tracing::debug!(plugin = %plugin, name = %self.name, class = %class, "running handler");

        let result = self.inner.call(subject);

        #[cfg(feature = "tracing")]
        match &result {
            Ok(value) => {
                tracing::debug!(plugin = %plugin, class = %class, ?value, "handler returned")
            }
            Err(err) => {
                tracing::warn!(plugin = %plugin, class = %class, error = %err, "handler failed")
            }
        }

        result
    }
}
