//! # PersonaChat Session
//!
//! The conversation session engine: composes the system directive from
//! persona and style, windows the history for each request, runs exchanges
//! against a [`GenerationBackend`](personachat_core::GenerationBackend) and
//! collects feedback on the replies.

pub mod composer;
pub mod store;
pub mod window;

pub use composer::{GUARDRAILS, PromptComposer};
pub use store::{
    ExchangeOutcome, ExchangePhase, FALLBACK_REPLY, PendingExchange, SessionState, SessionStore,
};
pub use window::window;
