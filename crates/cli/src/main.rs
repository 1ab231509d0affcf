//! PersonaChat CLI: the main entry point.
//!
//! Commands:
//! - `chat`      Interactive chat or single-message mode
//! - `personas`  List persona and style tables
//! - `config`    Show the effective or default configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "personachat",
    about = "PersonaChat: persona-driven chat assistant with response feedback",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Override the configured persona
        #[arg(short, long)]
        persona: Option<String>,

        /// Override the configured style
        #[arg(short, long)]
        style: Option<String>,
    },

    /// List available personas and styles
    Personas,

    /// Show configuration
    Config {
        /// Print the built-in defaults instead of the effective configuration
        #[arg(long, conflicts_with = "path")]
        default: bool,

        /// Print the configuration file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat {
            message,
            persona,
            style,
        } => commands::chat::run(message, persona, style).await?,
        Commands::Personas => commands::personas::run()?,
        Commands::Config { default, path } => {
            if path {
                commands::config_cmd::path()
            } else if default {
                commands::config_cmd::show_default()
            } else {
                commands::config_cmd::show()?
            }
        }
    }

    Ok(())
}
