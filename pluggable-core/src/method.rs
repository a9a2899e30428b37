//! # Method Tables
//!
//! The explicit dispatch table of a pluggable type: a case-insensitive map
//! from declared method names to invokers taking the object and its
//! positional arguments. Built once per type and consulted by the
//! [`DispatchResolver`](crate::DispatchResolver).
//!
//! Two registration forms are supported:
//!
//! - [`MethodTableBuilder::method`] takes an ordinary typed function
//!   (`fn(&T, A1, ..., An) -> Result<R, E>`, up to twelve parameters) and
//!   converts each positional argument with [`FromArgument`].
//! - [`MethodTableBuilder::variadic`] takes `fn(&T, &[Value])` and receives
//!   the argument list untouched, whatever its length.

use crate::{context::FromArgument, error::BoxError};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// A type-erased method invoker.
pub type MethodFn<T> = Box<dyn Fn(&T, &[Value]) -> Result<Value, BoxError> + Send + Sync>;

struct MethodEntry<T> {
    name: String,
    invoke: MethodFn<T>,
}

/// Dispatch table of a pluggable type.
pub struct MethodTable<T> {
    methods: HashMap<String, MethodEntry<T>>,
}

impl<T> MethodTable<T> {
    /// Start building a table.
    pub fn builder() -> MethodTableBuilder<T> {
        MethodTableBuilder::new()
    }

    /// Whether a method with this name is declared (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(&name.to_lowercase())
    }

    /// The name a method was declared under.
    pub fn declared_name(&self, name: &str) -> Option<&str> {
        self.methods
            .get(&name.to_lowercase())
            .map(|entry| entry.name.as_str())
    }

    /// Invoke a declared method, or `None` if it is not declared.
    pub fn invoke(
        &self,
        target: &T,
        name: &str,
        args: &[Value],
    ) -> Option<Result<Value, BoxError>> {
        let entry = self.methods.get(&name.to_lowercase())?;
        Some((entry.invoke)(target, args))
    }

    /// Declared names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.values().map(|entry| entry.name.as_str())
    }

    /// Number of declared methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no methods are declared.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<T> std::fmt::Debug for MethodTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("MethodTable").field("methods", &names).finish()
    }
}

/// Builder for a [`MethodTable`].
///
/// Declaring the same name twice keeps the later declaration.
pub struct MethodTableBuilder<T> {
    methods: HashMap<String, MethodEntry<T>>,
}

impl<T> Default for MethodTableBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MethodTableBuilder<T> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Declare a typed method.
    pub fn method<Args, M>(self, name: &str, method: M) -> Self
    where
        M: IntoMethod<T, Args>,
    {
        self.insert(name, method.into_method())
    }

    /// Declare a method that takes the raw positional argument list.
    pub fn variadic<F>(self, name: &str, method: F) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.insert(name, Box::new(method))
    }

    fn insert(mut self, name: &str, invoke: MethodFn<T>) -> Self {
        self.methods.insert(
            name.to_lowercase(),
            MethodEntry {
                name: name.to_string(),
                invoke,
            },
        );
        self
    }

    /// Build the table.
    pub fn build(self) -> MethodTable<T> {
        MethodTable {
            methods: self.methods,
        }
    }
}

/// Conversion of a typed function into a [`MethodFn`].
///
/// Implemented for `Fn(&T, A1, ..., An) -> Result<R, E>` with up to twelve
/// parameters, where every `Ai: FromArgument`, `R: Serialize` and
/// `E: Into<BoxError>`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be declared as a method of `{T}`",
    label = "expected `fn(&{T}, ...) -> Result<impl Serialize, impl Into<BoxError>>`",
    note = "Use `MethodTableBuilder::variadic` for methods taking the raw argument list."
)]
pub trait IntoMethod<T, Args>: Send + Sync + 'static {
    /// Erase the function's signature.
    fn into_method(self) -> MethodFn<T>;
}

/// Macro to implement IntoMethod for functions with N positional parameters.
macro_rules! impl_into_method {
    ($($A:ident),*) => {
        impl<T, F, R, E, $($A,)*> IntoMethod<T, ($($A,)*)> for F
        where
            T: 'static,
            F: Fn(&T, $($A,)*) -> Result<R, E> + Send + Sync + 'static,
            R: Serialize,
            E: Into<BoxError>,
            $($A: FromArgument + 'static,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_method(self) -> MethodFn<T> {
                Box::new(move |target: &T, args: &[Value]| -> Result<Value, BoxError> {
                    let mut index = 0;
                    $(
                        let $A = $A::from_argument(args, index)?;
                        index += 1;
                    )*
                    let output = (self)(target, $($A,)*).map_err(Into::into)?;
                    Ok(serde_json::to_value(output)?)
                })
            }
        }
    };
}

impl_into_method!();
impl_into_method!(A1);
impl_into_method!(A1, A2);
impl_into_method!(A1, A2, A3);
impl_into_method!(A1, A2, A3, A4);
impl_into_method!(A1, A2, A3, A4, A5);
impl_into_method!(A1, A2, A3, A4, A5, A6);
impl_into_method!(A1, A2, A3, A4, A5, A6, A7);
impl_into_method!(A1, A2, A3, A4, A5, A6, A7, A8);
impl_into_method!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_into_method!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
impl_into_method!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
impl_into_method!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);

/// Builds a type's [`MethodTable`] once and returns it as `&'static`.
///
/// Each entry is `method "name" => function` (typed) or
/// `variadic "name" => function` (raw argument list).
///
/// # Example
///
/// ```rust,ignore
/// impl Pluggable for Widget {
///     fn pluggable_core(&self) -> &PluggableCore {
///         &self.core
///     }
///
///     fn methods() -> &'static MethodTable<Self> {
///         method_table!(Widget {
///             method "xRender" => Widget::render,
///             variadic "Sum" => Widget::sum,
///         })
///     }
/// }
/// ```
#[macro_export]
macro_rules! method_table {
    ($ty:ty { $($kind:ident $name:literal => $method:expr),* $(,)? }) => {{
        static TABLE: ::std::sync::OnceLock<$crate::MethodTable<$ty>> =
            ::std::sync::OnceLock::new();
        TABLE.get_or_init(|| {
            $crate::MethodTable::<$ty>::builder()
                $(.$kind($name, $method))*
                .build()
        })
    }};
}
