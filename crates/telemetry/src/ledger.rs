//! Append-only feedback ledger.

use crate::TelemetryError;
use crate::model::*;
use chrono::Utc;
use std::collections::BTreeMap;

/// What the caller knows about the exchange being rated.
#[derive(Debug, Clone, Default)]
pub struct FeedbackContext {
    pub persona: String,
    pub style: String,
    /// Number of user/assistant messages in the log (system excluded).
    pub dialog_len: usize,
    pub user_message: String,
    pub assistant_message: String,
}

/// Stores ratings for the lifetime of the process.
///
/// Entries are never edited or removed once recorded.
#[derive(Debug, Default)]
pub struct FeedbackLedger {
    entries: Vec<FeedbackEntry>,
    next_id: u64,
}

impl FeedbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rating for the most recent exchange.
    ///
    /// Returns `None` without touching the ledger when the conversation has
    /// no complete exchange yet. A blank comment is stored as no comment.
    pub fn record(
        &mut self,
        rating: Rating,
        comment: Option<&str>,
        context: &FeedbackContext,
    ) -> Option<FeedbackEntry> {
        if context.dialog_len < 2 {
            tracing::debug!(
                dialog_len = context.dialog_len,
                "Ignoring feedback: no completed exchange yet"
            );
            return None;
        }

        self.next_id += 1;
        let entry = FeedbackEntry {
            id: self.next_id,
            timestamp: Utc::now(),
            persona: context.persona.clone(),
            style: context.style.clone(),
            rating,
            comment: comment
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
            user_message: context.user_message.clone(),
            assistant_message: context.assistant_message.clone(),
        };

        tracing::info!(
            id = entry.id,
            rating = %entry.rating,
            persona = %entry.persona,
            "Feedback recorded"
        );
        self.entries.push(entry.clone());
        Some(entry)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Satisfaction metrics over every entry.
    pub fn metrics(&self) -> SatisfactionMetrics {
        metrics(&self.entries)
    }

    /// Satisfaction metrics grouped by persona, ordered by persona name.
    pub fn metrics_by_persona(&self) -> BTreeMap<String, SatisfactionMetrics> {
        let mut grouped: BTreeMap<String, Vec<FeedbackEntry>> = BTreeMap::new();
        for entry in &self.entries {
            grouped
                .entry(entry.persona.clone())
                .or_default()
                .push(entry.clone());
        }
        grouped
            .into_iter()
            .map(|(persona, entries)| (persona, metrics(&entries)))
            .collect()
    }

    /// Entries that carry a comment, oldest first.
    pub fn comments(&self) -> impl Iterator<Item = &FeedbackEntry> {
        self.entries.iter().filter(|e| e.comment.is_some())
    }

    /// Pretty JSON dump of every entry.
    pub fn to_json(&self) -> Result<String, TelemetryError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(persona: &str, dialog_len: usize) -> FeedbackContext {
        FeedbackContext {
            persona: persona.into(),
            style: "Formal".into(),
            dialog_len,
            user_message: "o que é recursão?".into(),
            assistant_message: "Como educador...".into(),
        }
    }

    #[test]
    fn record_requires_completed_exchange() {
        let mut ledger = FeedbackLedger::new();
        assert!(ledger.record(Rating::Positive, None, &context("Professor", 0)).is_none());
        assert!(ledger.record(Rating::Positive, None, &context("Professor", 1)).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn single_positive_rating_metrics() {
        let mut ledger = FeedbackLedger::new();
        let entry = ledger
            .record(Rating::Positive, None, &context("Professor", 2))
            .unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(entry.user_message, "o que é recursão?");

        let m = ledger.metrics();
        assert_eq!(m.total, 1);
        assert_eq!(m.positive_count, 1);
        assert_eq!(m.negative_count, 0);
        assert_eq!(m.satisfaction_rate, 100.0);
    }

    #[test]
    fn ids_are_monotonic() {
        let mut ledger = FeedbackLedger::new();
        let ctx = context("Analista", 4);
        let ids: Vec<u64> = (0..3)
            .filter_map(|_| ledger.record(Rating::Negative, None, &ctx))
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn comments_are_trimmed_and_blank_dropped() {
        let mut ledger = FeedbackLedger::new();
        let ctx = context("Professor", 2);
        ledger.record(Rating::Positive, Some("   "), &ctx);
        ledger.record(Rating::Negative, Some("  muito longo "), &ctx);

        let commented: Vec<_> = ledger.comments().collect();
        assert_eq!(commented.len(), 1);
        assert_eq!(commented[0].comment.as_deref(), Some("muito longo"));
        assert_eq!(ledger.entries()[0].comment, None);
    }

    #[test]
    fn metrics_grouped_by_persona() {
        let mut ledger = FeedbackLedger::new();
        ledger.record(Rating::Positive, None, &context("Professor", 2));
        ledger.record(Rating::Negative, None, &context("Professor", 4));
        ledger.record(Rating::Positive, None, &context("Analista", 2));

        let by_persona = ledger.metrics_by_persona();
        assert_eq!(by_persona.len(), 2);
        assert_eq!(by_persona["Professor"].total, 2);
        assert!((by_persona["Professor"].satisfaction_rate - 50.0).abs() < 1e-9);
        assert_eq!(by_persona["Analista"].satisfaction_rate, 100.0);
    }

    #[test]
    fn json_export_lists_entries() {
        let mut ledger = FeedbackLedger::new();
        ledger.record(Rating::Positive, Some("ótimo"), &context("Professor", 2));
        let json = ledger.to_json().unwrap();
        let parsed: Vec<FeedbackEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].comment.as_deref(), Some("ótimo"));
        assert!(json.contains("\"positive\""));
    }
}
