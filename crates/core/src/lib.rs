//! # PersonaChat Core
//!
//! Domain types, traits, and error definitions for the PersonaChat session engine.
//! This crate has **zero framework dependencies**; it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The generation backend is defined as a trait here. Implementations live in
//! `personachat-providers`. This enables:
//! - Swapping the simulated backend for a remote one via configuration
//! - Easy testing with deterministic stub backends
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod directives;
pub mod error;
pub mod event;
pub mod message;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use backend::{GenerationBackend, GenerationParams};
pub use directives::{DirectiveTable, FALLBACK_PERSONA};
pub use error::{Error, GenerationError, Result};
pub use event::{EventBus, SessionEvent};
pub use message::{Message, Role};
pub use session::SessionConfig;
