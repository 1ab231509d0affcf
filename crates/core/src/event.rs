//! Session event system: lets a presentation layer follow the engine
//! without polling its state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Everything observable that happens inside a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The system directive was recomposed for a new persona/style
    ConfigurationChanged {
        persona: String,
        style: String,
        timestamp: DateTime<Utc>,
    },

    /// A user message was accepted and generation began
    ExchangeStarted {
        content_preview: String,
        context_messages: usize,
        timestamp: DateTime<Utc>,
    },

    /// The backend produced a reply
    ExchangeCompleted {
        backend: String,
        reply_chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// The backend failed; a fallback message was appended instead
    ExchangeFailed {
        backend: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// The dialog was cleared
    ConversationReset { timestamp: DateTime<Utc> },

    /// A rating was stored in the feedback ledger
    FeedbackRecorded {
        entry_id: u64,
        positive: bool,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for session events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<SessionEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<SessionEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
