#![allow(dead_code)]

use lazy_static::lazy_static;
use pluggable::{
    BoxError, EventArguments, HandlerRegistry, MethodTable, Pluggable, PluggableCore, Registry,
    RegistryBuilder, Subject, Value, testing::CallLog,
};
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Test Payloads
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub body: String,
}

// ============================================================================
// Test Pluggable Object
// ============================================================================

/// A pluggable object declaring methods under both naming conventions:
/// `xRender`, `xSave`, `xSum`, `xExplode` (prefixed) and `Publish` (plain).
pub struct Discussion {
    core: PluggableCore,
    pub journal: CallLog,
    body_calls: AtomicUsize,
}

impl Discussion {
    pub fn new(registry: Registry) -> Self {
        Self::with_registry(Arc::new(registry))
    }

    pub fn with_registry(registry: Arc<dyn HandlerRegistry>) -> Self {
        Self {
            core: PluggableCore::with_identity("Discussion", registry),
            journal: CallLog::new(),
            body_calls: AtomicUsize::new(0),
        }
    }

    pub fn uninitialized(registry: Registry) -> Self {
        Self {
            core: PluggableCore::new(Arc::new(registry)),
            journal: CallLog::new(),
            body_calls: AtomicUsize::new(0),
        }
    }

    /// How many times any of the object's own method bodies ran.
    pub fn body_calls(&self) -> usize {
        self.body_calls.load(Ordering::SeqCst)
    }

    fn ran(&self, name: &str) {
        self.body_calls.fetch_add(1, Ordering::SeqCst);
        self.journal.push(name);
    }

    fn render(&self, view: String) -> Result<String, BoxError> {
        self.ran("render");
        Ok(format!("<{view}>"))
    }

    fn publish(&self) -> Result<bool, BoxError> {
        self.ran("publish");
        Ok(true)
    }

    fn save(&self, draft: Draft) -> Result<Draft, BoxError> {
        self.ran("save");
        self.fire_event_with(
            "BeforeSave",
            EventArguments::new().with("Title", draft.title.clone()),
        )?;
        Ok(draft)
    }

    fn sum(&self, args: &[Value]) -> Result<Value, BoxError> {
        self.ran("sum");
        let total: i64 = args.iter().filter_map(Value::as_i64).sum();
        Ok(Value::from(total))
    }

    fn explode(&self) -> Result<(), std::io::Error> {
        self.ran("explode");
        Err(std::io::Error::other("kaboom"))
    }
}

lazy_static! {
    static ref DISCUSSION_METHODS: MethodTable<Discussion> = MethodTable::builder()
        .method("xRender", Discussion::render)
        .method("Publish", Discussion::publish)
        .method("xSave", Discussion::save)
        .variadic("xSum", Discussion::sum)
        .method("xExplode", Discussion::explode)
        .build();
}

impl Pluggable for Discussion {
    fn pluggable_core(&self) -> &PluggableCore {
        &self.core
    }

    fn methods() -> &'static MethodTable<Self> {
        &DISCUSSION_METHODS
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn discussion(builder: RegistryBuilder) -> Discussion {
    Discussion::new(builder.build())
}

pub fn text(s: &str) -> Value {
    Value::String(s.to_string())
}
