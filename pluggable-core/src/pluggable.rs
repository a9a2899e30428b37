//! # Pluggable Objects
//!
//! A pluggable object owns a [`PluggableCore`] and a static
//! [`MethodTable`]. Implementing [`Pluggable`] for it grants the
//! [`Subject`] surface: call interception, event firing, one-shot fire-as
//! redirection and access to the return ledger.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Discussion {
//!     core: PluggableCore,
//! }
//!
//! impl Discussion {
//!     fn save(&self, title: String) -> Result<bool, BoxError> {
//!         self.fire_event("BeforeSave")?;
//!         Ok(!title.is_empty())
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
//! let discussion = Discussion { core: PluggableCore::with_identity("Discussion", registry) };
//! discussion.intercept("Save", vec![json!("Hello")])?;
//! ```

use crate::{
    context::EventArguments,
    dispatch,
    error::PluggableError,
    ledger::ReturnLedger,
    method::MethodTable,
    registry::{HandlerRegistry, HandlerReturns, HandlerType},
};
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard, RwLock};
use serde_json::Value;
use std::{
    any::Any,
    sync::{Arc, OnceLock},
};

/// Options for redirecting the identity of the next event firing.
///
/// Built from a bare identity (`"Foo".into()`) or explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FireAs {
    /// Identity the next firing is looked up under. `None` leaves any
    /// pending redirection cleared.
    pub class: Option<String>,
}

impl FireAs {
    /// Redirect to `class`.
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
        }
    }
}

impl From<&str> for FireAs {
    fn from(class: &str) -> Self {
        Self::class(class)
    }
}

impl From<String> for FireAs {
    fn from(class: String) -> Self {
        Self::class(class)
    }
}

/// The per-object state behind every pluggable object.
///
/// Interior mutability lets dispatch run through `&self`, so handlers may
/// re-enter the same object. A reentrant turn lock is held for the whole of
/// each intercepted call and event firing: re-entry from the dispatching
/// thread proceeds, other threads wait their turn. The state locks are never
/// held while a handler or method body runs.
///
/// A handler that hands the object to another thread and blocks on that
/// thread calling back into it will deadlock.
pub struct PluggableCore {
    turn: ReentrantMutex<()>,
    identity: OnceLock<String>,
    registry: Arc<dyn HandlerRegistry>,
    arguments: RwLock<EventArguments>,
    returns: RwLock<ReturnLedger>,
    handler_type: Mutex<HandlerType>,
    fire_as: Mutex<Option<String>>,
}

impl PluggableCore {
    /// Create a core whose identity is established later with
    /// [`establish_identity`](Self::establish_identity).
    pub fn new(registry: Arc<dyn HandlerRegistry>) -> Self {
        Self {
            turn: ReentrantMutex::new(()),
            identity: OnceLock::new(),
            registry,
            arguments: RwLock::new(EventArguments::new()),
            returns: RwLock::new(ReturnLedger::new()),
            handler_type: Mutex::new(HandlerType::Normal),
            fire_as: Mutex::new(None),
        }
    }

    /// Create a core with its identity established.
    pub fn with_identity(identity: impl Into<String>, registry: Arc<dyn HandlerRegistry>) -> Self {
        let core = Self::new(registry);
        let _ = core.identity.set(identity.into());
        core
    }

    /// Establish the class identity handlers are looked up under. Succeeds
    /// once.
    pub fn establish_identity(&self, identity: impl Into<String>) -> Result<(), PluggableError> {
        self.identity.set(identity.into()).map_err(|_| {
            PluggableError::IdentityAlreadyEstablished {
                current: self.identity.get().cloned().unwrap_or_default(),
            }
        })
    }

    /// The established identity, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.get().map(String::as_str)
    }

    /// The injected handler registry.
    pub fn registry(&self) -> &dyn HandlerRegistry {
        &*self.registry
    }

    /// Snapshot of the current event arguments.
    pub fn event_arguments(&self) -> EventArguments {
        self.arguments.read().clone()
    }

    /// A single current event argument.
    pub fn event_argument(&self, name: &str) -> Option<Value> {
        self.arguments.read().get(name).cloned()
    }

    /// Insert or replace an event argument, returning the previous value.
    pub fn set_event_argument(
        &self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.arguments.write().set(name, value)
    }

    /// Edit the event arguments in place.
    ///
    /// The closure runs under the arguments lock and must not dispatch.
    pub fn update_event_arguments<R>(&self, edit: impl FnOnce(&mut EventArguments) -> R) -> R {
        edit(&mut self.arguments.write())
    }

    /// How the most recently completed intercepted call was satisfied.
    pub fn handler_type(&self) -> HandlerType {
        *self.handler_type.lock()
    }

    /// What `plugin` returned from `handler` (e.g. `"Render_Before"`).
    ///
    /// `None` means no plugin returned a value under that key; it is not an
    /// error.
    pub fn get_return(&self, plugin: &str, handler: &str) -> Option<Value> {
        self.returns.read().get(plugin, handler).cloned()
    }

    /// Snapshot of the whole return ledger.
    pub fn returns(&self) -> ReturnLedger {
        self.returns.read().clone()
    }

    /// Redirect the identity used by the next event firing only.
    pub fn fire_as(&self, target: impl Into<FireAs>) {
        *self.fire_as.lock() = target.into().class;
    }

    /// The pending fire-as redirection, if one is set.
    pub fn pending_fire_as(&self) -> Option<String> {
        self.fire_as.lock().clone()
    }

    /// Hold the object's dispatch turn until the guard drops.
    pub(crate) fn enter(&self) -> ReentrantMutexGuard<'_, ()> {
        self.turn.lock()
    }

    pub(crate) fn take_fire_as(&self) -> Option<String> {
        self.fire_as.lock().take()
    }

    pub(crate) fn merge_event_arguments(&self, extra: EventArguments) {
        self.arguments.write().merge(extra);
    }

    pub(crate) fn replace_event_arguments(&self, args: EventArguments) -> EventArguments {
        std::mem::replace(&mut *self.arguments.write(), args)
    }

    pub(crate) fn set_handler_type(&self, handler_type: HandlerType) {
        *self.handler_type.lock() = handler_type;
    }

    pub(crate) fn record_returns(&self, key: &str, returns: &HandlerReturns) {
        if returns.is_empty() {
            return;
        }
        let mut ledger = self.returns.write();
        for entry in returns {
            ledger.record(key, &entry.plugin, entry.value.clone());
        }
    }
}

impl std::fmt::Debug for PluggableCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluggableCore")
            .field("identity", &self.identity.get())
            .field("handler_type", &self.handler_type())
            .field("fire_as", &self.pending_fire_as())
            .finish_non_exhaustive()
    }
}

/// A type whose methods can be intercepted by plugins.
///
/// Implement this for the object; the [`Subject`] surface comes for free.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not `Pluggable`",
    label = "missing `Pluggable` implementation",
    note = "Pluggable types expose their `PluggableCore` and a static `MethodTable`."
)]
pub trait Pluggable: Send + Sync + Sized + 'static {
    /// The object's dispatch state.
    fn pluggable_core(&self) -> &PluggableCore;

    /// The type's dispatch table, built once.
    fn methods() -> &'static MethodTable<Self>;
}

/// The object-safe view of a pluggable object handed to handlers.
///
/// Every [`Pluggable`] type is a `Subject`.
pub trait Subject: Send + Sync {
    /// The object's dispatch state.
    fn core(&self) -> &PluggableCore;

    /// Run the full interception protocol for `method` with positional
    /// `args`: resolve, Before handlers, override/new/own body, After
    /// handlers.
    fn intercept(&self, method: &str, args: Vec<Value>) -> Result<Value, PluggableError>;

    /// Merge `extra` into the event arguments and fire `event` to every
    /// general handler registered for the object's identity (or the pending
    /// fire-as identity).
    fn fire_event_with(
        &self,
        event: &str,
        extra: EventArguments,
    ) -> Result<HandlerReturns, PluggableError>;

    /// Downcast support for handlers that know the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Fire `event` without extra arguments.
    fn fire_event(&self, event: &str) -> Result<HandlerReturns, PluggableError> {
        self.fire_event_with(event, EventArguments::new())
    }

    /// Redirect the next firing to another identity and return `self` for
    /// chaining: `obj.fire_as("Foo").fire_event("Bar")`.
    ///
    /// Not callable on `&dyn Subject`; handlers write
    /// `subject.core().fire_as("Foo")` then `subject.fire_event("Bar")`.
    fn fire_as(&self, target: impl Into<FireAs>) -> &Self
    where
        Self: Sized,
    {
        self.core().fire_as(target);
        self
    }

    /// What `plugin` returned from `handler`; see
    /// [`PluggableCore::get_return`].
    fn get_return(&self, plugin: &str, handler: &str) -> Option<Value> {
        self.core().get_return(plugin, handler)
    }

    /// How the most recently completed intercepted call was satisfied.
    fn handler_type(&self) -> HandlerType {
        self.core().handler_type()
    }
}

impl<T: Pluggable> Subject for T {
    fn core(&self) -> &PluggableCore {
        self.pluggable_core()
    }

    fn intercept(&self, method: &str, args: Vec<Value>) -> Result<Value, PluggableError> {
        dispatch::intercept(self, method, args)
    }

    fn fire_event_with(
        &self,
        event: &str,
        extra: EventArguments,
    ) -> Result<HandlerReturns, PluggableError> {
        dispatch::fire_event(self, event, extra)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<'a> dyn Subject + 'a {
    /// Downcast to the concrete pluggable type.
    pub fn downcast_ref<T: Pluggable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
