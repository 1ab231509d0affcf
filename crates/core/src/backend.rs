//! GenerationBackend trait: the abstraction over reply generators.
//!
//! A backend knows how to turn a (windowed) conversation plus sampling
//! parameters into one assistant reply.
//!
//! Implementations: simulated (canned persona templates), remote (HTTP provider).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::message::Message;
use crate::session::SessionConfig;

/// Snapshot of the numeric session settings sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,

    /// Nucleus sampling cutoff
    pub top_p: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Turn budget used to window the history for this request
    pub memory_turns: u32,
}

impl From<&SessionConfig> for GenerationParams {
    fn from(config: &SessionConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            memory_turns: config.memory_turns,
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

/// The core GenerationBackend trait.
///
/// The session engine calls `generate()` without knowing which backend is
/// configured. Each call is independent; a backend keeps no per-session state.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "simulated", "remote").
    fn name(&self) -> &str;

    /// Produce the assistant reply for the given messages.
    async fn generate(
        &self,
        messages: Vec<Message>,
        params: GenerationParams,
    ) -> std::result::Result<String, GenerationError>;

    /// Health check: can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, GenerationError> {
        Ok(true)
    }
}
