//! Per-object record of the values plugin handlers returned.

use serde_json::Value;
use std::collections::HashMap;

/// Storage of handler return values keyed by `(handler, plugin)`.
///
/// Both key components are case-insensitive. Entries are never pruned for
/// the life of the owning object; recording the same pair again keeps the
/// latest value.
#[derive(Debug, Clone, Default)]
pub struct ReturnLedger {
    returns: HashMap<String, HashMap<String, Value>>,
}

impl ReturnLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value `plugin` returned from the handler named `handler`.
    pub fn record(&mut self, handler: &str, plugin: &str, value: Value) {
        self.returns
            .entry(handler.to_lowercase())
            .or_default()
            .insert(plugin.to_lowercase(), value);
    }

    /// Look up what `plugin` returned from `handler`.
    ///
    /// `None` means no plugin returned a value under that key.
    pub fn get(&self, plugin: &str, handler: &str) -> Option<&Value> {
        self.returns
            .get(&handler.to_lowercase())?
            .get(&plugin.to_lowercase())
    }

    /// Whether a value was recorded for the pair.
    pub fn contains(&self, plugin: &str, handler: &str) -> bool {
        self.get(plugin, handler).is_some()
    }

    /// All plugin returns recorded for one handler key, keyed by lowercased
    /// plugin identity.
    pub fn for_handler(&self, handler: &str) -> Option<&HashMap<String, Value>> {
        self.returns.get(&handler.to_lowercase())
    }

    /// Total number of recorded `(handler, plugin)` pairs.
    pub fn len(&self) -> usize {
        self.returns.values().map(HashMap::len).sum()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.returns.values().all(HashMap::is_empty)
    }
}
