//! In-memory handler registry.
//!
//! This module provides a builder for registering plugin handlers and a
//! frozen [`Registry`] implementing [`HandlerRegistry`] for immutable,
//! thread-safe dispatch.

use pluggable_core::{BoxError, Handler, HandlerRegistry, HandlerReturns, Phase, Subject, Value};
use std::{collections::HashMap, sync::Arc};

/// Metadata for a registered handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationMeta {
    /// Priority (lower = executed first). Default is 0.
    pub priority: i32,
}

impl RegistrationMeta {
    /// Create default metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// A handler with the key it is registered under.
pub struct HandlerEntry {
    class: String,
    method: String,
    phase: Phase,
    plugin: String,
    handler: Arc<dyn Handler>,
    meta: RegistrationMeta,
}

impl HandlerEntry {
    /// Identity of the pluggable class the handler targets.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Reference name of the method or event.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// When the handler runs.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Identity of the owning plugin.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// The handler itself.
    pub fn handler(&self) -> &dyn Handler {
        &*self.handler
    }

    /// Get the metadata.
    pub fn meta(&self) -> &RegistrationMeta {
        &self.meta
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("class", &self.class)
            .field("method", &self.method)
            .field("phase", &self.phase)
            .field("plugin", &self.plugin)
            .field("priority", &self.meta.priority)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    class: String,
    method: String,
    phase: Phase,
}

impl Key {
    fn new(class: &str, method: &str, phase: Phase) -> Self {
        Self {
            class: class.to_lowercase(),
            method: method.to_lowercase(),
            phase,
        }
    }
}

// ============================================================================
// RegistryBuilder - for constructing registries
// ============================================================================

/// Builder for constructing a Registry.
///
/// Use this to register handlers, then call `.build()` to create an
/// immutable, thread-safe `Registry`.
///
/// # Example
/// ```ignore
/// let registry = RegistryBuilder::new()
///     .before("Discussion", "Save", "SpamGuard", spam_check)
///     .override_method("Discussion", "Render", "Theme", themed_render)
///     .general("Discussion", "AfterSave", "Notify", notify)
///     .build();
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<HandlerEntry>,
}

impl RegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler with default metadata.
    pub fn register<H: Handler>(
        self,
        class: &str,
        method: &str,
        phase: Phase,
        plugin: &str,
        handler: H,
    ) -> Self {
        self.register_with_meta(class, method, phase, plugin, handler, RegistrationMeta::new())
    }

    /// Register a handler with specified metadata.
    pub fn register_with_meta<H: Handler>(
        mut self,
        class: &str,
        method: &str,
        phase: Phase,
        plugin: &str,
        handler: H,
        meta: RegistrationMeta,
    ) -> Self {
        self.register_mut(class, method, phase, plugin, handler, meta);
        self
    }

    /// Register a handler with specified metadata (mutable version).
    pub fn register_mut<H: Handler>(
        &mut self,
        class: &str,
        method: &str,
        phase: Phase,
        plugin: &str,
        handler: H,
        meta: RegistrationMeta,
    ) {
        self.entries.push(HandlerEntry {
            class: class.to_string(),
            method: method.to_string(),
            phase,
            plugin: plugin.to_string(),
            handler: Arc::new(handler),
            meta,
        });
    }

    /// Register a handler that runs before `class.method`.
    pub fn before<H: Handler>(self, class: &str, method: &str, plugin: &str, handler: H) -> Self {
        self.register(class, method, Phase::Before, plugin, handler)
    }

    /// Register a handler that runs after `class.method`.
    pub fn after<H: Handler>(self, class: &str, method: &str, plugin: &str, handler: H) -> Self {
        self.register(class, method, Phase::After, plugin, handler)
    }

    /// Register a handler for an event fired by `class`.
    pub fn general<H: Handler>(self, class: &str, event: &str, plugin: &str, handler: H) -> Self {
        self.register(class, event, Phase::General, plugin, handler)
    }

    /// Register a replacement for `class.method`.
    pub fn override_method<H: Handler>(
        self,
        class: &str,
        method: &str,
        plugin: &str,
        handler: H,
    ) -> Self {
        self.register(class, method, Phase::Override, plugin, handler)
    }

    /// Register a method `class` does not declare itself.
    pub fn new_method<H: Handler>(
        self,
        class: &str,
        method: &str,
        plugin: &str,
        handler: H,
    ) -> Self {
        self.register(class, method, Phase::New, plugin, handler)
    }

    /// Build the immutable Registry.
    ///
    /// Entries are stably sorted by priority, so handlers sharing a priority
    /// keep their registration order.
    pub fn build(mut self) -> Registry {
        // Sort by priority (lower = first)
        self.entries.sort_by_key(|e| e.meta.priority);

        let mut index: HashMap<Key, Vec<usize>> = HashMap::new();
        for (position, entry) in self.entries.iter().enumerate() {
            index
                .entry(Key::new(&entry.class, &entry.method, entry.phase))
                .or_default()
                .push(position);
        }

        Registry {
            entries: self.entries,
            index,
        }
    }

    /// Get the number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the builder has no handlers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Registry - immutable, thread-safe handler storage
// ============================================================================

/// An immutable, thread-safe registry of plugin handlers.
///
/// Created by calling `RegistryBuilder::build()`. Lookups ignore case in
/// both class and method names. When several overrides (or new methods)
/// share a key, the first in priority order is the one invoked.
pub struct Registry {
    entries: Vec<HandlerEntry>,
    index: HashMap<Key, Vec<usize>>,
}

impl Registry {
    /// Handlers registered for `(class, method, phase)` in execution order.
    pub fn handlers_for<'a>(
        &'a self,
        class: &str,
        method: &str,
        phase: Phase,
    ) -> impl Iterator<Item = &'a HandlerEntry> + use<'a> {
        let positions = self
            .index
            .get(&Key::new(class, method, phase))
            .map(Vec::as_slice)
            .unwrap_or_default();
        positions.iter().map(move |&position| &self.entries[position])
    }

    fn first(&self, class: &str, method: &str, phase: Phase) -> Option<&HandlerEntry> {
        self.handlers_for(class, method, phase).next()
    }

    fn call_single(
        &self,
        subject: &dyn Subject,
        class: &str,
        method: &str,
        phase: Phase,
    ) -> Result<Value, BoxError> {
        let entry = self
            .first(class, method, phase)
            .ok_or_else(|| format!("no {phase} handler registered for `{class}.{method}`"))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            plugin = %entry.plugin,
            class = %class,
            method = %method,
            %phase,
            "invoking handler"
        );

        entry.handler.call(subject)
    }

    /// All registrations, in execution order.
    pub fn registrations(&self) -> &[HandlerEntry] {
        &self.entries
    }

    /// Get the number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries)
            .finish()
    }
}

impl HandlerRegistry for Registry {
    fn has_override(&self, class: &str, method: &str) -> bool {
        self.first(class, method, Phase::Override).is_some()
    }

    fn call_override(
        &self,
        subject: &dyn Subject,
        class: &str,
        method: &str,
    ) -> Result<Value, BoxError> {
        self.call_single(subject, class, method, Phase::Override)
    }

    fn has_new_method(&self, class: &str, method: &str) -> bool {
        self.first(class, method, Phase::New).is_some()
    }

    fn call_new_method(
        &self,
        subject: &dyn Subject,
        class: &str,
        method: &str,
    ) -> Result<Value, BoxError> {
        self.call_single(subject, class, method, Phase::New)
    }

    fn call_handlers(
        &self,
        subject: &dyn Subject,
        class: &str,
        method: &str,
        phase: Phase,
    ) -> Result<HandlerReturns, BoxError> {
        let mut returns = HandlerReturns::new();
        for entry in self.handlers_for(class, method, phase) {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                plugin = %entry.plugin,
                class = %class,
                method = %method,
                %phase,
                "invoking handler"
            );

            let value = entry.handler.call(subject)?;
            returns.push(entry.plugin.as_str(), value);
        }
        Ok(returns)
    }
}
