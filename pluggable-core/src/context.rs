//! # Event Arguments
//!
//! The mutable, ordered name→value mapping shared with every handler invoked
//! during one dispatch. Handlers may read and rewrite it before the
//! underlying method executes.
//!
//! Intercepted calls store their positional arguments under the names
//! `"0"`, `"1"`, … so that handlers can address them either by name or by
//! position.

use crate::error::ArgumentError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Ordered mapping of argument names to values.
///
/// Insertion order is preserved; setting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventArguments {
    entries: Vec<(String, Value)>,
}

impl EventArguments {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build arguments from a positional list, naming each value by its index.
    pub fn from_positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            entries: values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, v)| v)
    }

    /// Get a mutable reference to a value by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, v)| v)
    }

    /// Get a value by insertion position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.entries.get(index).map(|(_, v)| v)
    }

    /// Deserialize the named value into `T`.
    ///
    /// A missing name reads as `null`, so `Option<T>` yields `None`.
    pub fn extract<T: DeserializeOwned>(&self, name: &str) -> Result<T, serde_json::Error> {
        let value = self.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter().position(|(key, _)| *key == name) {
            Some(pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Remove a value by name.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Merge `other` into `self`: existing names are overwritten, new names
    /// are appended in `other`'s order.
    pub fn merge(&mut self, other: EventArguments) {
        for (name, value) in other.entries {
            self.set(name, value);
        }
    }

    /// Iterate over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Values in order, dropping their names.
    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for EventArguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = EventArguments::new();
        for (k, v) in iter {
            args.set(k, v);
        }
        args
    }
}

/// A trait for reading a typed parameter out of a positional argument list.
///
/// Positions past the end of the list read as `null`.
pub trait FromArgument: Sized {
    /// Read the parameter at `index`.
    fn from_argument(args: &[Value], index: usize) -> Result<Self, ArgumentError>;
}

impl<T: DeserializeOwned> FromArgument for T {
    fn from_argument(args: &[Value], index: usize) -> Result<Self, ArgumentError> {
        let value = args.get(index).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| ArgumentError::new(index, e))
    }
}
