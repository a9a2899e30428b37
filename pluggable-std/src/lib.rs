//! # pluggable-std
//!
//! Standard implementations for pluggable objects.
//!
//! This crate provides:
//! - **Handler registry**: [`Registry`], [`RegistryBuilder`]
//! - **Standard handlers**: [`LoggingHandler`](handlers::LoggingHandler)
//! - **Testing utilities**: recording, fixed-value and failing handlers

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use pluggable_core;

// Modules
pub mod handlers;
pub mod registry;
pub mod testing;

pub use registry::{HandlerEntry, RegistrationMeta, Registry, RegistryBuilder};
