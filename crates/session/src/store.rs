//! The session store, sole owner and writer of the conversation log.
//!
//! One exchange runs at a time:
//!
//! ```text
//! Idle → Generating → {Completed | Failed} → AwaitingFeedback → Idle
//! ```
//!
//! `send_message` drives a whole exchange against the injected backend.
//! Callers that need to run generation themselves use `begin_exchange` and
//! `finish_exchange`; the store still rejects a second exchange while one is
//! pending.

use chrono::Utc;
use personachat_core::error::GenerationError;
use personachat_core::event::{EventBus, SessionEvent};
use personachat_core::message::{Message, Role};
use personachat_core::{GenerationBackend, GenerationParams, SessionConfig};
use personachat_telemetry::{
    FeedbackContext, FeedbackEntry, FeedbackLedger, Rating, SatisfactionMetrics,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::composer::PromptComposer;
use crate::window::window;

/// Assistant text appended when the backend fails.
pub const FALLBACK_REPLY: &str =
    "⚠️ Desculpe, ocorreu um erro ao processar sua mensagem. Tente novamente.";

const PREVIEW_CHARS: usize = 60;

/// How the latest exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Completed,
    Failed,
}

/// Where the session stands in the exchange state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    Idle,
    Generating,
    /// A completed exchange that has not been rated yet.
    AwaitingFeedback,
}

/// Conversation state. Only [`SessionStore`] mutates it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    messages: Vec<Message>,
    is_generating: bool,
    last_exchange_rated: bool,
    last_outcome: Option<ExchangeOutcome>,
}

impl SessionState {
    /// The full log, system message first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn last_exchange_rated(&self) -> bool {
        self.last_exchange_rated
    }

    pub fn last_outcome(&self) -> Option<ExchangeOutcome> {
        self.last_outcome
    }

    /// The active system directive, if any.
    pub fn system_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::System)
    }

    /// Number of user/assistant messages.
    pub fn dialog_len(&self) -> usize {
        self.messages.iter().filter(|m| m.role.is_dialog()).count()
    }

    fn last_content(&self, role: Role) -> String {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == role)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    fn replace_system(&mut self, directive: String) -> bool {
        if self
            .system_message()
            .is_some_and(|m| m.content == directive)
        {
            return false;
        }
        self.messages.retain(|m| m.role != Role::System);
        self.messages.insert(0, Message::system(directive));
        true
    }
}

/// Everything the backend needs for one accepted user message.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    /// Windowed context, user message last
    pub context: Vec<Message>,
    pub params: GenerationParams,
}

/// Owns the conversation, the configuration and the feedback ledger.
pub struct SessionStore {
    composer: PromptComposer,
    backend: Arc<dyn GenerationBackend>,
    config: SessionConfig,
    state: SessionState,
    ledger: FeedbackLedger,
    events: Arc<EventBus>,
}

impl SessionStore {
    /// Create a store with the given directive tables, backend and initial
    /// configuration. The log starts with the composed system message.
    pub fn new(
        composer: PromptComposer,
        backend: Arc<dyn GenerationBackend>,
        config: SessionConfig,
    ) -> Self {
        let config = sanitize(config);
        let mut state = SessionState::default();
        state.replace_system(composer.compose(&config.persona, &config.style));

        Self {
            composer,
            backend,
            config,
            state,
            ledger: FeedbackLedger::new(),
            events: Arc::new(EventBus::default()),
        }
    }

    /// Publish events on a shared bus instead of a private one.
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    /// Apply a new configuration.
    ///
    /// The system message is replaced only when the composed directive
    /// differs from the current one; dialog messages are never touched.
    /// Numeric settings outside their ranges are clamped.
    pub fn configure(&mut self, config: SessionConfig) {
        self.config = sanitize(config);
        let directive = self
            .composer
            .compose(&self.config.persona, &self.config.style);

        if self.state.replace_system(directive) {
            info!(
                persona = %self.config.persona,
                style = %self.config.style,
                "System directive updated"
            );
            self.events.publish(SessionEvent::ConfigurationChanged {
                persona: self.config.persona.clone(),
                style: self.config.style.clone(),
                timestamp: Utc::now(),
            });
        }
    }

    /// Accept a user message and prepare its request.
    ///
    /// Returns `None`, leaving the log untouched, when the text is blank or an
    /// exchange is already in flight.
    pub fn begin_exchange(&mut self, text: &str) -> Option<PendingExchange> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank message");
            return None;
        }
        if self.state.is_generating {
            debug!("Ignoring message: generation already in flight");
            return None;
        }

        self.state.messages.push(Message::user(text));
        self.state.is_generating = true;

        let context = window(&self.state.messages, self.config.memory_turns);
        let params = GenerationParams::from(&self.config);

        debug!(
            context = context.len(),
            memory_turns = params.memory_turns,
            "Exchange started"
        );
        self.events.publish(SessionEvent::ExchangeStarted {
            content_preview: text.chars().take(PREVIEW_CHARS).collect(),
            context_messages: context.len(),
            timestamp: Utc::now(),
        });

        Some(PendingExchange { context, params })
    }

    /// Close the in-flight exchange with the backend's result.
    ///
    /// A failure appends [`FALLBACK_REPLY`] instead of raising. Returns
    /// `None` when no exchange was in flight (for instance after `reset`),
    /// in which case the result is discarded.
    pub fn finish_exchange(
        &mut self,
        result: Result<String, GenerationError>,
    ) -> Option<ExchangeOutcome> {
        if !self.state.is_generating {
            warn!("Discarding generation result: no exchange in flight");
            return None;
        }

        let backend = self.backend.name().to_string();
        let outcome = match result {
            Ok(reply) => {
                info!(backend = %backend, reply_chars = reply.chars().count(), "Exchange completed");
                self.events.publish(SessionEvent::ExchangeCompleted {
                    backend,
                    reply_chars: reply.chars().count(),
                    timestamp: Utc::now(),
                });
                self.state.messages.push(Message::assistant(reply));
                ExchangeOutcome::Completed
            }
            Err(e) => {
                warn!(backend = %backend, error = %e, "Generation failed");
                self.events.publish(SessionEvent::ExchangeFailed {
                    backend,
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                self.state.messages.push(Message::assistant(FALLBACK_REPLY));
                ExchangeOutcome::Failed
            }
        };

        self.state.is_generating = false;
        self.state.last_exchange_rated = false;
        self.state.last_outcome = Some(outcome);
        Some(outcome)
    }

    /// Run one full exchange against the configured backend.
    ///
    /// Returns `None` if the message was rejected (blank, or an exchange is
    /// already in flight).
    pub async fn send_message(&mut self, text: &str) -> Option<ExchangeOutcome> {
        let pending = self.begin_exchange(text)?;
        let result = self
            .backend
            .generate(pending.context, pending.params)
            .await;
        self.finish_exchange(result)
    }

    /// Clear the dialog and start over with a freshly composed directive.
    ///
    /// An exchange still pending is abandoned. The feedback ledger is kept.
    pub fn reset(&mut self) {
        if self.state.is_generating {
            warn!("Reset while generating; pending reply will be discarded");
        }
        let directive = self
            .composer
            .compose(&self.config.persona, &self.config.style);
        self.state = SessionState::default();
        self.state.replace_system(directive);

        info!("Conversation reset");
        self.events.publish(SessionEvent::ConversationReset {
            timestamp: Utc::now(),
        });
    }

    /// Rate the most recent exchange.
    ///
    /// A no-op returning `None` until at least one user/assistant exchange
    /// exists, and while a reply is still being generated.
    pub fn record_feedback(
        &mut self,
        rating: Rating,
        comment: Option<&str>,
    ) -> Option<FeedbackEntry> {
        if self.state.is_generating {
            debug!("Ignoring feedback: reply still generating");
            return None;
        }

        let context = FeedbackContext {
            persona: self.config.persona.clone(),
            style: self.config.style.clone(),
            dialog_len: self.state.dialog_len(),
            user_message: self.state.last_content(Role::User),
            assistant_message: self.state.last_content(Role::Assistant),
        };

        let entry = self.ledger.record(rating, comment, &context)?;
        self.state.last_exchange_rated = true;
        self.events.publish(SessionEvent::FeedbackRecorded {
            entry_id: entry.id,
            positive: entry.rating.is_positive(),
            timestamp: Utc::now(),
        });
        Some(entry)
    }

    pub fn metrics(&self) -> SatisfactionMetrics {
        self.ledger.metrics()
    }

    pub fn ledger(&self) -> &FeedbackLedger {
        &self.ledger
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }

    /// Current position in the exchange state machine.
    pub fn phase(&self) -> ExchangePhase {
        if self.state.is_generating {
            return ExchangePhase::Generating;
        }
        match self.state.last_outcome {
            Some(ExchangeOutcome::Completed) if !self.state.last_exchange_rated => {
                ExchangePhase::AwaitingFeedback
            }
            _ => ExchangePhase::Idle,
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<SessionEvent>> {
        self.events.subscribe()
    }
}

fn sanitize(config: SessionConfig) -> SessionConfig {
    if let Err(e) = config.validate() {
        warn!("{e}; clamping into range");
        return config.clamped();
    }
    config
}
