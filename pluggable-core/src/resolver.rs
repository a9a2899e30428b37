//! # Dispatch Resolver
//!
//! Decides, for a requested method name, which method actually runs and
//! under which *reference name* plugins see the call.
//!
//! Interceptable methods follow a dual naming convention around the reserved
//! prefix `x`:
//!
//! - `Render` is requested → plugins see `Render`, the object runs `xRender`
//!   (the default behavior was declared under the prefixed name).
//! - `xRender` is requested → plugins see `Render`, the object runs `Render`
//!   (a plain-declared method reached through the prefixed alias).
//!
//! Either way the reference name is the same, so plugins never need to know
//! which convention the object author chose.

use crate::{
    error::PluggableError,
    method::MethodTable,
    registry::{HandlerRegistry, HandlerType},
};

/// Prefix marking a method as the interceptable implementation of its
/// unprefixed reference name.
pub const RESERVED_PREFIX: char = 'x';

/// Methods of the retired UI-slicing capability.
pub const REMOVED_METHODS: &[&str] =
    &["enableSlicing", "slice", "addSliceAsset", "renderSliceConfig"];

/// Remediation attached to [`PluggableError::RemovedCapability`].
pub const REMOVED_GUIDANCE: &str =
    "UI slicing is no longer supported; \
     render the view fragment through the hosting application instead";

/// Fail with [`PluggableError::RemovedCapability`] if `requested` belongs to
/// a retired capability.
pub fn check_removed(requested: &str) -> Result<(), PluggableError> {
    if REMOVED_METHODS
        .iter()
        .any(|removed| removed.eq_ignore_ascii_case(requested))
    {
        return Err(PluggableError::RemovedCapability {
            method: requested.to_string(),
            guidance: REMOVED_GUIDANCE,
        });
    }
    Ok(())
}

/// The two names a requested method resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodNames {
    /// Prefix-independent name used for handler lookup.
    pub reference: String,
    /// Name of the method the object itself would run.
    pub actual: String,
}

impl MethodNames {
    /// Apply the naming convention to `requested`.
    ///
    /// The prefix alone (`"x"`) is an ordinary name, not an alias of `""`.
    pub fn resolve(requested: &str) -> Self {
        match requested.strip_prefix(RESERVED_PREFIX) {
            Some(stripped) if !stripped.is_empty() => Self {
                reference: stripped.to_string(),
                actual: stripped.to_string(),
            },
            _ => Self {
                reference: requested.to_string(),
                actual: format!("{RESERVED_PREFIX}{requested}"),
            },
        }
    }
}

/// A call that resolved to something executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    /// Reference and actual names.
    pub names: MethodNames,
    /// Whether the actual method is declared on the object.
    pub declared: bool,
}

/// Resolves calls against a type's method table and the injected registry.
pub struct DispatchResolver<'a, T> {
    methods: &'a MethodTable<T>,
    registry: &'a dyn HandlerRegistry,
}

impl<'a, T> DispatchResolver<'a, T> {
    /// Create a resolver.
    pub fn new(methods: &'a MethodTable<T>, registry: &'a dyn HandlerRegistry) -> Self {
        Self { methods, registry }
    }

    /// Resolve `requested` for an object of identity `class`.
    ///
    /// Fails with [`PluggableError::UnknownMethod`] when the actual method is
    /// not declared and no new-method handler exists for the reference name.
    pub fn resolve(&self, class: &str, requested: &str) -> Result<ResolvedCall, PluggableError> {
        let names = MethodNames::resolve(requested);
        let declared = self.methods.contains(&names.actual);
        if !declared && !self.registry.has_new_method(class, &names.reference) {
            return Err(PluggableError::UnknownMethod {
                class: class.to_string(),
                method: names.actual,
            });
        }
        Ok(ResolvedCall { names, declared })
    }

    /// Pick the body to run, in priority order: override, new method, the
    /// object's own method.
    pub fn select_body(&self, class: &str, reference: &str) -> HandlerType {
        if self.registry.has_override(class, reference) {
            HandlerType::Override
        } else if self.registry.has_new_method(class, reference) {
            HandlerType::New
        } else {
            HandlerType::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::BoxError,
        pluggable::Subject,
        registry::{HandlerReturns, NoHandlers, Phase},
    };
    use serde_json::{Value, json};
    use std::convert::Infallible;

    struct Doc;

    impl Doc {
        fn render(&self) -> Result<&'static str, Infallible> {
            Ok("rendered")
        }
    }

    fn methods() -> MethodTable<Doc> {
        MethodTable::builder()
            .method("xRender", Doc::render)
            .method("Publish", Doc::render)
            .build()
    }

    /// Registry that answers yes for one override and one new method.
    struct Flags {
        override_of: &'static str,
        new_method: &'static str,
    }

    impl HandlerRegistry for Flags {
        fn has_override(&self, _class: &str, method: &str) -> bool {
            method.eq_ignore_ascii_case(self.override_of)
        }

        fn call_override(&self, _: &dyn Subject, _: &str, _: &str) -> Result<Value, BoxError> {
            Ok(json!("override"))
        }

        fn has_new_method(&self, _class: &str, method: &str) -> bool {
            method.eq_ignore_ascii_case(self.new_method)
        }

        fn call_new_method(&self, _: &dyn Subject, _: &str, _: &str) -> Result<Value, BoxError> {
            Ok(json!("new"))
        }

        fn call_handlers(
            &self,
            _: &dyn Subject,
            _: &str,
            _: &str,
            _: Phase,
        ) -> Result<HandlerReturns, BoxError> {
            Ok(HandlerReturns::new())
        }
    }

    #[test]
    fn plain_name_targets_prefixed_method() {
        let names = MethodNames::resolve("Render");
        assert_eq!(names.reference, "Render");
        assert_eq!(names.actual, "xRender");
    }

    #[test]
    fn prefixed_name_targets_plain_method() {
        let names = MethodNames::resolve("xPublish");
        assert_eq!(names.reference, "Publish");
        assert_eq!(names.actual, "Publish");
    }

    #[test]
    fn bare_prefix_is_not_an_alias() {
        let names = MethodNames::resolve("x");
        assert_eq!(names.reference, "x");
        assert_eq!(names.actual, "xx");
    }

    #[test]
    fn uppercase_x_is_not_the_prefix() {
        let names = MethodNames::resolve("Xport");
        assert_eq!(names.reference, "Xport");
        assert_eq!(names.actual, "xXport");
    }

    #[test]
    fn both_conventions_share_reference_names() {
        let table = methods();
        let resolver = DispatchResolver::new(&table, &NoHandlers);

        let declared_prefixed = resolver.resolve("Doc", "Render").unwrap();
        let declared_plain = resolver.resolve("Doc", "xPublish").unwrap();
        assert!(declared_prefixed.declared);
        assert!(declared_plain.declared);
        assert_eq!(declared_prefixed.names.reference, "Render");
        assert_eq!(declared_plain.names.reference, "Publish");
    }

    #[test]
    fn unknown_method_without_new_handler() {
        let table = methods();
        let resolver = DispatchResolver::new(&table, &NoHandlers);

        let err = resolver.resolve("Doc", "Archive").unwrap_err();
        assert!(matches!(
            err,
            PluggableError::UnknownMethod { ref class, ref method }
                if class == "Doc" && method == "xArchive"
        ));
    }

    #[test]
    fn new_method_handler_makes_missing_method_resolvable() {
        let table = methods();
        let registry = Flags {
            override_of: "",
            new_method: "archive",
        };
        let resolver = DispatchResolver::new(&table, &registry);

        let call = resolver.resolve("Doc", "Archive").unwrap();
        assert!(!call.declared);
        assert_eq!(resolver.select_body("Doc", "Archive"), HandlerType::New);
    }

    #[test]
    fn override_wins_over_new_and_normal() {
        let table = methods();
        let registry = Flags {
            override_of: "Render",
            new_method: "Render",
        };
        let resolver = DispatchResolver::new(&table, &registry);

        assert_eq!(resolver.select_body("Doc", "Render"), HandlerType::Override);
        assert_eq!(resolver.select_body("Doc", "Publish"), HandlerType::Normal);
    }

    #[test]
    fn removed_methods_are_rejected() {
        for name in ["enableSlicing", "EnableSlicing", "slice", "addSliceAsset"] {
            let err = check_removed(name).unwrap_err();
            assert!(matches!(err, PluggableError::RemovedCapability { .. }));
            assert!(err.to_string().contains(REMOVED_GUIDANCE));
        }
        assert!(check_removed("render").is_ok());
    }
}
