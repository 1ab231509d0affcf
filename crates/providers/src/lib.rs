//! Generation backend implementations for PersonaChat.
//!
//! All backends implement the `personachat_core::GenerationBackend` trait.
//! The router builds the configured one.

pub mod remote;
pub mod router;
pub mod simulated;

pub use remote::RemoteBackend;
pub use router::build_from_config;
pub use simulated::SimulatedBackend;
