//! Data model for feedback entries and aggregated satisfaction metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Rating ────────────────────────────────────────────────────────────────

/// A thumbs-up or thumbs-down on one assistant reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Positive,
    Negative,
}

impl Rating {
    pub fn is_positive(self) -> bool {
        self == Self::Positive
    }

    /// The emoji shown next to a rating in listings.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Positive => "👍",
            Self::Negative => "👎",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

// ── Entry ─────────────────────────────────────────────────────────────────

/// One recorded rating together with the exchange it judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Monotonic id, starting at 1 per ledger.
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub persona: String,
    pub style: String,
    pub rating: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub user_message: String,
    pub assistant_message: String,
}

// ── Aggregated views ──────────────────────────────────────────────────────

/// Aggregate over a set of feedback entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionMetrics {
    pub total: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    /// Percentage of positive ratings, 0 when there are none.
    pub satisfaction_rate: f64,
}

/// Compute satisfaction metrics over `entries`.
pub fn metrics(entries: &[FeedbackEntry]) -> SatisfactionMetrics {
    let total = entries.len();
    let positive_count = entries.iter().filter(|e| e.rating.is_positive()).count();
    let negative_count = total - positive_count;
    let satisfaction_rate = if total > 0 {
        positive_count as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    SatisfactionMetrics {
        total,
        positive_count,
        negative_count,
        satisfaction_rate,
    }
}
