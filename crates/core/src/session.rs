//! Session configuration chosen by the caller.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{Error, Result};

pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const TOP_P_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 64..=2048;
pub const MEMORY_TURNS_RANGE: RangeInclusive<u32> = 0..=20;

/// Persona, style and sampling settings for one conversation.
///
/// Owned by the caller and handed to the engine by value. The engine only
/// reads it to compose the system directive and the per-request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key into the persona table
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Key into the style table
    #[serde(default = "default_style")]
    pub style: String,

    #[serde(default = "default_temperature", serialize_with = "serialize_unit")]
    pub temperature: f32,

    #[serde(default = "default_top_p", serialize_with = "serialize_unit")]
    pub top_p: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Number of user/assistant turns sent back to the backend as context
    #[serde(default = "default_memory_turns")]
    pub memory_turns: u32,
}

/// Write an `f32` setting as the short decimal a user would type, so
/// `0.7` does not come out as `0.699999988079071`.
fn serialize_unit<S: serde::Serializer>(
    value: &f32,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64((f64::from(*value) * 1e6).round() / 1e6)
}

fn default_persona() -> String {
    "Professor".into()
}
fn default_style() -> String {
    "Formal".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_max_tokens() -> u32 {
    512
}
fn default_memory_turns() -> u32 {
    6
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            style: default_style(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            memory_turns: default_memory_turns(),
        }
    }
}

impl SessionConfig {
    /// Convenience constructor keeping the default numeric settings.
    pub fn new(persona: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            style: style.into(),
            ..Self::default()
        }
    }

    /// Reject numeric settings outside their documented ranges.
    pub fn validate(&self) -> Result<()> {
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            return Err(config_error(format!(
                "temperature must be between 0.0 and 1.0 (got {})",
                self.temperature
            )));
        }
        if !TOP_P_RANGE.contains(&self.top_p) {
            return Err(config_error(format!(
                "top_p must be between 0.0 and 1.0 (got {})",
                self.top_p
            )));
        }
        if !MAX_TOKENS_RANGE.contains(&self.max_tokens) {
            return Err(config_error(format!(
                "max_tokens must be between 64 and 2048 (got {})",
                self.max_tokens
            )));
        }
        if !MEMORY_TURNS_RANGE.contains(&self.memory_turns) {
            return Err(config_error(format!(
                "memory_turns must be between 0 and 20 (got {})",
                self.memory_turns
            )));
        }
        Ok(())
    }

    /// A copy with every numeric setting clamped into range.
    ///
    /// NaN temperatures or top_p values collapse to the range minimum.
    pub fn clamped(&self) -> Self {
        Self {
            persona: self.persona.clone(),
            style: self.style.clone(),
            temperature: clamp_unit(self.temperature),
            top_p: clamp_unit(self.top_p),
            max_tokens: self
                .max_tokens
                .clamp(*MAX_TOKENS_RANGE.start(), *MAX_TOKENS_RANGE.end()),
            memory_turns: self.memory_turns.min(*MEMORY_TURNS_RANGE.end()),
        }
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn config_error(message: String) -> Error {
    Error::Config { message }
}
