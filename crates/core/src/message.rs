//! Message domain types.
//!
//! These are the value objects that flow through the whole engine:
//! the caller submits text → the session appends a user message → the backend
//! receives a windowed slice of the log → its reply comes back as an assistant message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System directive (persona, style, guardrails)
    System,
    /// The end user
    User,
    /// The assistant reply
    Assistant,
}

impl Role {
    /// Whether this role belongs to the user/assistant dialog.
    pub fn is_dialog(self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a conversation.
///
/// Messages are never edited in place. A configuration change replaces the
/// system message with a new one instead of rewriting its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Olá!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Olá!");
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn messages_get_distinct_ids() {
        let a = Message::assistant("a");
        let b = Message::assistant("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn role_dialog_classification() {
        assert!(Role::User.is_dialog());
        assert!(Role::Assistant.is_dialog());
        assert!(!Role::System.is_dialog());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::system("rules")).unwrap();
        assert!(json.contains("\"role\":\"system\""));
    }
}
