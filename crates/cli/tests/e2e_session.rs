//! End-to-end tests for the PersonaChat session engine.
//!
//! These tests wire the real pieces together (config loading, backend
//! router, simulated backend, prompt composer, session store, feedback
//! ledger) and drive whole conversations through them.

use std::sync::{Arc, Mutex};

use personachat_config::{AppConfig, BackendKind};
use personachat_core::error::GenerationError;
use personachat_core::message::{Message, Role};
use personachat_core::{DirectiveTable, GenerationBackend, GenerationParams, SessionConfig};
use personachat_providers::{SimulatedBackend, build_from_config};
use personachat_session::{
    ExchangeOutcome, ExchangePhase, FALLBACK_REPLY, PromptComposer, SessionStore,
};
use personachat_telemetry::{FeedbackEntry, Rating};

// ── Helpers ──────────────────────────────────────────────────────────────

fn simulated_store(config: SessionConfig) -> SessionStore {
    SessionStore::new(
        PromptComposer::builtin(),
        Arc::new(SimulatedBackend::instant(DirectiveTable::builtin_personas())),
        config,
    )
}

fn last_reply(store: &SessionStore) -> &str {
    let last = store.state().messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    &last.content
}

/// Wraps the simulated backend and keeps every context it was sent.
struct RecordingBackend {
    inner: SimulatedBackend,
    contexts: Mutex<Vec<Vec<Message>>>,
}

#[async_trait::async_trait]
impl GenerationBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(
        &self,
        messages: Vec<Message>,
        params: GenerationParams,
    ) -> Result<String, GenerationError> {
        self.contexts.lock().unwrap().push(messages.clone());
        self.inner.generate(messages, params).await
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_professor_formal_single_exchange() {
    let mut store = simulated_store(SessionConfig::new("Professor", "Formal"));

    let outcome = store.send_message("o que é recursão?").await;
    assert_eq!(outcome, Some(ExchangeOutcome::Completed));

    let roles: Vec<Role> = store.state().messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);

    let reply = last_reply(&store);
    assert!(reply.starts_with("Como educador"));
    assert!(reply.contains("\"o que é recursão?\""));
    assert!(reply.ends_with("*Modo simulação - Professor | temp=0.7*"));
    assert_eq!(store.phase(), ExchangePhase::AwaitingFeedback);
}

#[tokio::test]
async fn e2e_every_builtin_persona_is_detected_from_the_directive() {
    let personas = DirectiveTable::builtin_personas();
    for persona in personas.keys() {
        for style in DirectiveTable::builtin_styles().keys() {
            let mut store = simulated_store(SessionConfig::new(persona, style));
            store.send_message("teste").await;
            let suffix = format!("*Modo simulação - {persona} | temp=0.7*");
            assert!(last_reply(&store).ends_with(&suffix), "{persona}/{style}");
        }
    }
}

#[tokio::test]
async fn e2e_persona_switch_mid_conversation() {
    let mut store = simulated_store(SessionConfig::new("Professor", "Formal"));
    store.send_message("primeira").await;

    store.configure(SessionConfig::new("Analista", "Técnico"));
    store.send_message("segunda").await;

    assert_eq!(store.state().messages().len(), 5);
    assert!(last_reply(&store).starts_with("Analisando sua questão sobre \"segunda\""));
    assert_eq!(
        store
            .state()
            .messages()
            .iter()
            .filter(|m| m.role == Role::System)
            .count(),
        1
    );
}

#[tokio::test]
async fn e2e_unknown_persona_gets_generic_reply() {
    let mut store = simulated_store(SessionConfig::new("Astronauta", "Formal"));
    store.send_message("como chegar à lua?").await;

    let reply = last_reply(&store);
    assert!(reply.starts_with("Entendi sua pergunta sobre \"como chegar à lua?\""));
    assert!(reply.ends_with("*Modo simulação - Assistente | temp=0.7*"));
}

#[tokio::test]
async fn e2e_memory_window_limits_context() {
    let backend = Arc::new(RecordingBackend {
        inner: SimulatedBackend::instant(DirectiveTable::builtin_personas()),
        contexts: Mutex::new(Vec::new()),
    });
    let config = SessionConfig {
        memory_turns: 1,
        ..SessionConfig::new("Suporte Técnico", "Simples")
    };
    let mut store = SessionStore::new(PromptComposer::builtin(), backend.clone(), config);

    for question in ["p1", "p2", "p3"] {
        store.send_message(question).await;
    }

    let contexts = backend.contexts.lock().unwrap();
    assert_eq!(contexts.len(), 3);
    let last = &contexts[2];
    assert_eq!(last.len(), 3);
    assert_eq!(last[0].role, Role::System);
    assert_eq!(last[1].role, Role::Assistant);
    assert_eq!(last[2].content, "p3");

    // Seven messages in the log, only the latest pair inside the window.
    let windowed = personachat_session::window(store.state().messages(), 1);
    assert_eq!(store.state().messages().len(), 7);
    assert_eq!(windowed.len(), 3);
    assert_eq!(windowed[1].content, "p3");
}

#[tokio::test]
async fn e2e_feedback_flow_and_export() {
    let mut store = simulated_store(SessionConfig::new("Professor", "Formal"));

    // Nothing to rate yet.
    assert!(store.record_feedback(Rating::Positive, None).is_none());
    assert_eq!(store.ledger().len(), 0);

    store.send_message("o que é recursão?").await;
    store.record_feedback(Rating::Positive, Some("bem didático"));

    store.configure(SessionConfig::new("Contador de Histórias", "Empático"));
    store.send_message("conte sobre persistência").await;
    store.record_feedback(Rating::Negative, Some("longo demais"));

    store.send_message("e agora?").await;
    store.record_feedback(Rating::Positive, None);

    let metrics = store.metrics();
    assert_eq!(metrics.total, 3);
    assert_eq!(metrics.positive_count, 2);
    assert_eq!(metrics.negative_count, 1);
    assert!((metrics.satisfaction_rate - 200.0 / 3.0).abs() < 1e-9);

    let by_persona = store.ledger().metrics_by_persona();
    assert_eq!(by_persona["Professor"].satisfaction_rate, 100.0);
    assert_eq!(by_persona["Contador de Histórias"].total, 2);

    let comments: Vec<&str> = store
        .ledger()
        .comments()
        .filter_map(|e| e.comment.as_deref())
        .collect();
    assert_eq!(comments, vec!["bem didático", "longo demais"]);

    let exported: Vec<FeedbackEntry> =
        serde_json::from_str(&store.ledger().to_json().unwrap()).unwrap();
    assert_eq!(exported.len(), 3);
    assert_eq!(exported[0].user_message, "o que é recursão?");
    assert_eq!(exported[1].persona, "Contador de Histórias");
    assert!(exported[2].id > exported[1].id);

    // Feedback survives a reset.
    store.reset();
    assert_eq!(store.state().messages().len(), 1);
    assert_eq!(store.metrics().total, 3);
}

#[tokio::test]
async fn e2e_config_file_drives_backend_and_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[session]
persona = "Chef"
style = "Simples"
temperature = 0.2
memory_turns = 2

[backend]
kind = "simulated"

[backend.simulated]
min_latency_ms = 0
max_latency_ms = 0

[[personas]]
key = "Chef"
directive = "Fale como um chef de cozinha."
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&path).unwrap();
    let backend = build_from_config(&config).unwrap();
    assert_eq!(backend.name(), "simulated");

    let composer = PromptComposer::new(config.persona_table(), config.style_table());
    let mut store = SessionStore::new(composer, backend, config.session.clone());

    let system = store.state().system_message().unwrap();
    assert!(system.content.contains("Fale como um chef de cozinha."));

    store.send_message("receita de pão").await;
    assert!(last_reply(&store).ends_with("*Modo simulação - Chef | temp=0.2*"));
}

#[tokio::test]
async fn e2e_remote_without_key_fails_gracefully() {
    let mut config = AppConfig::default();
    config.backend.kind = BackendKind::Remote;
    config.backend.remote.api_key = None;

    let backend = build_from_config(&config).unwrap();
    let mut store = SessionStore::new(PromptComposer::builtin(), backend, config.session.clone());

    let outcome = store.send_message("olá").await;
    assert_eq!(outcome, Some(ExchangeOutcome::Failed));
    assert_eq!(last_reply(&store), FALLBACK_REPLY);
    assert_eq!(store.phase(), ExchangePhase::Idle);
    assert!(!store.state().is_generating());

    // The session keeps accepting messages after a failure.
    assert_eq!(store.send_message("de novo").await, Some(ExchangeOutcome::Failed));
    assert_eq!(store.state().messages().len(), 5);
}
