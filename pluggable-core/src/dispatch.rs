//! The interception and event-firing protocols behind [`Subject`].
//!
//! [`Subject`]: crate::Subject

use crate::{
    context::EventArguments,
    error::PluggableError,
    pluggable::{Pluggable, PluggableCore, Subject},
    registry::{HandlerReturns, HandlerType, Phase},
    resolver::{DispatchResolver, check_removed},
};
use serde_json::Value;

/// Installs a call's arguments and puts the caller's back when dropped, so a
/// re-entrant call on the same object never clobbers the outer call's view.
struct ScopedArguments<'a> {
    core: &'a PluggableCore,
    saved: Option<EventArguments>,
}

impl<'a> ScopedArguments<'a> {
    fn install(core: &'a PluggableCore, args: EventArguments) -> Self {
        let saved = core.replace_event_arguments(args);
        Self {
            core,
            saved: Some(saved),
        }
    }
}

impl Drop for ScopedArguments<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.core.replace_event_arguments(saved);
        }
    }
}

pub(crate) fn fire_event(
    subject: &dyn Subject,
    event: &str,
    extra: EventArguments,
) -> Result<HandlerReturns, PluggableError> {
    let core = subject.core();
    let _turn = core.enter();
    // Consumed before anything can fail so it never outlives this firing.
    let redirected = core.take_fire_as();
    let identity = core.identity().ok_or(PluggableError::NotInitialized)?;

    if !extra.is_empty() {
        core.merge_event_arguments(extra);
    }

    let class = redirected.as_deref().unwrap_or(identity);
    fire_phase(subject, class, event, Phase::General)
}

pub(crate) fn intercept<T: Pluggable>(
    target: &T,
    requested: &str,
    args: Vec<Value>,
) -> Result<Value, PluggableError> {
    if let Err(err) = check_removed(requested) {
        #[cfg(feature = "tracing")]
        tracing::warn!(method = %requested, "call to removed capability");
        return Err(err);
    }

    let core = target.pluggable_core();
    // Declared before the argument scope so the restore happens inside the turn.
    let _turn = core.enter();
    let class = core.identity().ok_or(PluggableError::NotInitialized)?;
    let methods = T::methods();
    let resolver = DispatchResolver::new(methods, core.registry());

    let call = match resolver.resolve(class, requested) {
        Ok(call) => call,
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(class = %class, method = %requested, "unknown method");
            return Err(err);
        }
    };
    let reference = call.names.reference.as_str();

    let _scope = ScopedArguments::install(
        core,
        EventArguments::from_positional(args.iter().cloned()),
    );

    fire_phase(target, class, reference, Phase::Before)?;

    let handler_type = resolver.select_body(class, reference);
    core.set_handler_type(handler_type);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        class = %class,
        reference = %reference,
        actual = %call.names.actual,
        ?handler_type,
        "dispatching call"
    );

    let registry = core.registry();
    let result = match handler_type {
        HandlerType::Override => registry
            .call_override(target, class, reference)
            .map_err(|source| handler_error(class, reference, Phase::Override, source))?,
        HandlerType::New => registry
            .call_new_method(target, class, reference)
            .map_err(|source| handler_error(class, reference, Phase::New, source))?,
        HandlerType::Normal => {
            let actual = call.names.actual.as_str();
            methods
                .invoke(target, actual, &args)
                .ok_or_else(|| PluggableError::UnknownMethod {
                    class: class.to_string(),
                    method: actual.to_string(),
                })?
                .map_err(|source| PluggableError::Method {
                    method: actual.to_string(),
                    source,
                })?
        }
    };

    fire_phase(target, class, reference, Phase::After)?;

    // An After handler may have dispatched on this object again.
    core.set_handler_type(handler_type);
    Ok(result)
}

/// Run the handlers of one phase and record what they returned.
fn fire_phase(
    subject: &dyn Subject,
    class: &str,
    name: &str,
    phase: Phase,
) -> Result<HandlerReturns, PluggableError> {
    #[cfg(feature = "tracing")]
    tracing::trace!(class = %class, name = %name, %phase, "firing handlers");

    let core = subject.core();
    let returns = core
        .registry()
        .call_handlers(subject, class, name, phase)
        .map_err(|source| handler_error(class, name, phase, source))?;
    core.record_returns(&phase.ledger_key(name), &returns);
    Ok(returns)
}

fn handler_error(
    class: &str,
    method: &str,
    phase: Phase,
    source: crate::error::BoxError,
) -> PluggableError {
    PluggableError::Handler {
        class: class.to_string(),
        method: method.to_string(),
        phase,
        source,
    }
}
