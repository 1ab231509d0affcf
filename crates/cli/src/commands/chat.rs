//! `personachat chat`: Interactive or single-message chat mode.

use personachat_config::AppConfig;
use personachat_core::SessionConfig;
use personachat_session::{ExchangeOutcome, ExchangePhase, PromptComposer, SessionStore};
use personachat_telemetry::Rating;
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    Say(String),
    Persona(Option<String>),
    Style(Option<String>),
    Temperature(f32),
    Memory(u32),
    Reset,
    Rate(Rating, Option<String>),
    Stats,
    Export,
    Help,
    Exit,
    Invalid(String),
}

fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if matches!(line, "exit" | "quit" | ":q") {
        return ReplCommand::Exit;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Say(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    let arg = arg.map(String::from);

    match name {
        "persona" => ReplCommand::Persona(arg),
        "style" => ReplCommand::Style(arg),
        "temperature" | "temp" => match arg.as_deref().map(str::parse::<f32>) {
            Some(Ok(value)) => ReplCommand::Temperature(value),
            _ => ReplCommand::Invalid("uso: /temperature <0.0-1.0>".into()),
        },
        "memory" => match arg.as_deref().map(str::parse::<u32>) {
            Some(Ok(turns)) => ReplCommand::Memory(turns),
            _ => ReplCommand::Invalid("uso: /memory <0-20>".into()),
        },
        "reset" | "clear" => ReplCommand::Reset,
        "good" | "up" => ReplCommand::Rate(Rating::Positive, arg),
        "bad" | "down" => ReplCommand::Rate(Rating::Negative, arg),
        "stats" => ReplCommand::Stats,
        "export" => ReplCommand::Export,
        "help" | "?" => ReplCommand::Help,
        "exit" | "quit" => ReplCommand::Exit,
        other => ReplCommand::Invalid(format!("comando desconhecido: /{other} (veja /help)")),
    }
}

pub async fn run(
    message: Option<String>,
    persona: Option<String>,
    style: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let mut session_config = config.session.clone();
    if let Some(persona) = persona {
        session_config.persona = persona;
    }
    if let Some(style) = style {
        session_config.style = style;
    }

    let backend = personachat_providers::build_from_config(&config)
        .map_err(|e| format!("Failed to build backend: {e}"))?;
    let composer = PromptComposer::new(config.persona_table(), config.style_table());
    tracing::debug!(
        backend = backend.name(),
        persona = %session_config.persona,
        style = %session_config.style,
        "Starting chat session"
    );
    let mut store = SessionStore::new(composer, backend, session_config);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Pensando...");
        let outcome = store.send_message(&msg).await;
        eprint!("\r             \r");
        match outcome {
            Some(outcome) => {
                print_reply(&store);
                if outcome == ExchangeOutcome::Failed {
                    return Err("generation failed".into());
                }
            }
            None => return Err("empty message".into()),
        }
        return Ok(());
    }

    print_banner(&config, &store);

    let stdin = io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        match parse_command(&line) {
            ReplCommand::Exit => break,
            ReplCommand::Say(text) => {
                eprint!("  ...");
                let outcome = store.send_message(&text).await;
                eprint!("\r     \r");
                if outcome.is_some() {
                    print_reply(&store);
                }
                if store.phase() == ExchangePhase::AwaitingFeedback {
                    println!("  Avalie a resposta: /good [comentário] ou /bad [comentário]");
                    println!();
                }
            }
            ReplCommand::Persona(None) => list_keys("Personas", &store, true),
            ReplCommand::Style(None) => list_keys("Estilos", &store, false),
            ReplCommand::Persona(Some(key)) => {
                let next = SessionConfig {
                    persona: key,
                    ..store.config().clone()
                };
                apply(&mut store, next);
            }
            ReplCommand::Style(Some(key)) => {
                let next = SessionConfig {
                    style: key,
                    ..store.config().clone()
                };
                apply(&mut store, next);
            }
            ReplCommand::Temperature(temperature) => {
                let next = SessionConfig {
                    temperature,
                    ..store.config().clone()
                };
                apply(&mut store, next);
            }
            ReplCommand::Memory(memory_turns) => {
                let next = SessionConfig {
                    memory_turns,
                    ..store.config().clone()
                };
                apply(&mut store, next);
            }
            ReplCommand::Reset => {
                store.reset();
                println!("  🗑️  Conversa limpa.");
                println!();
            }
            ReplCommand::Rate(rating, comment) => rate(&mut store, rating, comment.as_deref()),
            ReplCommand::Stats => print_stats(&store),
            ReplCommand::Export => match store.ledger().to_json() {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("  [Erro] {e}"),
            },
            ReplCommand::Help => print_help(),
            ReplCommand::Invalid(reason) => {
                println!("  {reason}");
                println!();
            }
        }

        prompt()?;
    }

    println!();
    println!("  Até logo! 👋");
    println!();

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  Você > ");
    std::io::stdout().flush()
}

fn apply(store: &mut SessionStore, next: SessionConfig) {
    store.configure(next);
    let c = store.config();
    println!(
        "  ⚙️  {} | {} | temp={} | memória={} turnos",
        c.persona, c.style, c.temperature, c.memory_turns
    );
    println!();
}

fn rate(store: &mut SessionStore, rating: Rating, comment: Option<&str>) {
    if store.state().last_outcome() == Some(ExchangeOutcome::Failed) {
        println!("  A última resposta falhou; não há o que avaliar.");
        println!();
        return;
    }
    match store.record_feedback(rating, comment) {
        Some(entry) => println!("  {} Obrigado pelo feedback! (#{})", entry.rating.symbol(), entry.id),
        None => println!("  Envie uma mensagem antes de avaliar."),
    }
    println!();
}

fn print_reply(store: &SessionStore) {
    let Some(reply) = store.state().messages().last() else {
        return;
    };
    println!();
    for line in reply.content.lines() {
        println!("  Assistente > {line}");
    }
    println!();
}

fn print_banner(config: &AppConfig, store: &SessionStore) {
    let c = store.config();
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║       PersonaChat · Modo Interativo          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Backend:   {}", config.backend.kind);
    println!("  Persona:   {}", c.persona);
    println!("  Estilo:    {}", c.style);
    println!(
        "  Geração:   temp={} top_p={} max_tokens={} memória={}",
        c.temperature, c.top_p, c.max_tokens, c.memory_turns
    );
    println!();
    println!("  Digite sua mensagem e pressione Enter.");
    println!("  /help lista os comandos; 'exit' ou Ctrl+D para sair.");
    println!();
}

fn print_help() {
    println!("  /persona [chave]        Troca a persona (sem chave: lista)");
    println!("  /style [chave]          Troca o estilo (sem chave: lista)");
    println!("  /temperature <valor>    Ajusta a temperatura (0.0-1.0)");
    println!("  /memory <turnos>        Turnos de memória enviados (0-20)");
    println!("  /reset                  Limpa a conversa");
    println!("  /good [comentário]      Avalia a última resposta 👍");
    println!("  /bad [comentário]       Avalia a última resposta 👎");
    println!("  /stats                  Métricas de satisfação");
    println!("  /export                 Exporta os feedbacks em JSON");
    println!("  /exit                   Sai");
    println!();
}

fn list_keys(title: &str, store: &SessionStore, personas: bool) {
    let composer = store.composer();
    let (table, current) = if personas {
        (composer.personas(), store.config().persona.as_str())
    } else {
        (composer.styles(), store.config().style.as_str())
    };
    println!("  {title}:");
    for key in table.keys() {
        let marker = if key == current { "•" } else { " " };
        println!("   {marker} {key}");
    }
    println!();
}

fn print_stats(store: &SessionStore) {
    let m = store.metrics();
    println!("  📊 Analytics");
    println!("  ─────────────────────────────────────");
    println!("  Total de feedbacks: {}", m.total);
    println!("  Positivos:          {}", m.positive_count);
    println!("  Negativos:          {}", m.negative_count);
    println!("  Satisfação:         {:.1}%", m.satisfaction_rate);

    let by_persona = store.ledger().metrics_by_persona();
    if !by_persona.is_empty() {
        println!();
        for (persona, pm) in &by_persona {
            println!(
                "    {:<24} {:>3} avaliações  {:>5.1}%",
                persona, pm.total, pm.satisfaction_rate
            );
        }
    }

    let comments: Vec<_> = store.ledger().comments().collect();
    if !comments.is_empty() {
        println!();
        println!("  Comentários:");
        for entry in comments.iter().rev().take(5) {
            println!(
                "    {} [{}] {}",
                entry.rating.symbol(),
                entry.persona,
                entry.comment.as_deref().unwrap_or_default()
            );
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            parse_command("  o que é recursão? "),
            ReplCommand::Say("o que é recursão?".into())
        );
    }

    #[test]
    fn exit_words() {
        for word in ["exit", "quit", ":q", "/exit", "/quit"] {
            assert_eq!(parse_command(word), ReplCommand::Exit, "{word}");
        }
    }

    #[test]
    fn persona_and_style_keep_multi_word_keys() {
        assert_eq!(
            parse_command("/persona Suporte Técnico"),
            ReplCommand::Persona(Some("Suporte Técnico".into()))
        );
        assert_eq!(parse_command("/style"), ReplCommand::Style(None));
    }

    #[test]
    fn numeric_settings_parse_or_explain() {
        assert_eq!(parse_command("/temperature 0.3"), ReplCommand::Temperature(0.3));
        assert_eq!(parse_command("/memory 2"), ReplCommand::Memory(2));
        assert!(matches!(parse_command("/memory muitos"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command("/temperature"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn ratings_with_optional_comment() {
        assert_eq!(
            parse_command("/good muito claro"),
            ReplCommand::Rate(Rating::Positive, Some("muito claro".into()))
        );
        assert_eq!(parse_command("/bad"), ReplCommand::Rate(Rating::Negative, None));
    }

    #[test]
    fn unknown_command_is_reported() {
        assert!(matches!(parse_command("/voar"), ReplCommand::Invalid(msg) if msg.contains("/voar")));
    }
}
