//! Response feedback and satisfaction analytics for PersonaChat.
//!
//! Users rate assistant replies thumbs-up or thumbs-down, optionally with a
//! comment. The ledger keeps every rating for the lifetime of the process and
//! derives satisfaction metrics on demand.

pub mod ledger;
pub mod model;

pub use ledger::{FeedbackContext, FeedbackLedger};
pub use model::{FeedbackEntry, Rating, SatisfactionMetrics, metrics};

/// Errors from the telemetry subsystem.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
