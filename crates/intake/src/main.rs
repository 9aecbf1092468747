//! The `intake` CLI: chat with a local Ollama model or collect structured
//! data through a dialog.

#[macro_use]
extern crate tracing;

mod terminal;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use intake::core::chat::run_chat;
use intake::core::collect::{Collector, Outcome};
use intake::core::console::{Console, Line, send_with_progress};
use intake::core::conversation::SystemRetention;
use intake::core::extract::ReasoningMarkers;
use intake::core::{Session, SessionBuilder};
use intake::{brief, loan};
use intake_ollama_model::{Endpoint, OllamaConfigBuilder, OllamaProvider};

use crate::terminal::TerminalConsole;

const CHAT_MODEL: &str = "qwen3-coder:30b";
const BRIEF_MODEL: &str = "qwen3:30b";
const LOAN_MODEL: &str = "qwen3-coder:30b";
const CHAT_TIMEOUT: u64 = 30;
const CHAT_HISTORY_WINDOW: usize = 10;

/// Structured data collection against a local Ollama server
#[derive(Parser)]
#[command(name = "intake", version)]
struct Cli {
    /// Base URL of the Ollama server
    #[arg(
        long,
        global = true,
        env = "OLLAMA_BASE_URL",
        default_value = "http://localhost:11434"
    )]
    base_url: String,

    /// Model to use (defaults depend on the command)
    #[arg(long, global = true, env = "OLLAMA_MODEL")]
    model: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "OLLAMA_TIMEOUT", value_name = "SECONDS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the model; `!clear` starts over, `!quit` exits
    Chat {
        /// Optional system prompt, kept across `!clear`
        #[arg(long)]
        system: Option<String>,
    },

    /// Draft a game development brief, then review it
    Brief {
        /// Where to write the brief
        #[arg(long, default_value = "brief.json")]
        output: PathBuf,

        /// Skip the consistency review
        #[arg(long)]
        no_review: bool,
    },

    /// Fill in a mortgage credit application
    Loan {
        /// Where to write the application
        #[arg(long, default_value = "credit_application.json")]
        output: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let (default_model, endpoint) = match &cli.command {
        Command::Chat { .. } => (CHAT_MODEL, Endpoint::Generate),
        Command::Brief { .. } => (BRIEF_MODEL, Endpoint::Chat),
        Command::Loan { .. } => (LOAN_MODEL, Endpoint::Chat),
    };
    let Some(provider) = make_provider(&cli, default_model, endpoint) else {
        return;
    };

    let mut console = TerminalConsole::new();
    match &cli.command {
        Command::Chat { system } => {
            chat(provider, system.as_deref(), &mut console).await;
        }
        Command::Brief { output, no_review } => {
            collect_brief(provider, output, !no_review, &mut console).await;
        }
        Command::Loan { output } => {
            collect_loan(provider, output, &mut console).await;
        }
    }
}

fn make_provider(
    cli: &Cli,
    default_model: &str,
    endpoint: Endpoint,
) -> Option<OllamaProvider> {
    let model = cli.model.as_deref().unwrap_or(default_model);
    let timeout = match (cli.timeout, endpoint) {
        (Some(secs), _) => Some(secs),
        (None, Endpoint::Generate) => Some(CHAT_TIMEOUT),
        (None, Endpoint::Chat) => None,
    };

    let mut builder = OllamaConfigBuilder::with_model(model)
        .with_base_url(&cli.base_url)
        .with_endpoint(endpoint);
    if let Some(secs) = timeout {
        builder = builder.with_timeout(Duration::from_secs(secs));
    }

    match OllamaProvider::new(builder.build()) {
        Ok(provider) => Some(provider),
        Err(err) => {
            eprintln!("Cannot set up the Ollama client: {err}");
            None
        }
    }
}

async fn chat(
    provider: OllamaProvider,
    system: Option<&str>,
    console: &mut dyn Console,
) {
    console.show(Line::Heading("Simple chatbot"));
    console.show(Line::Notice("Type '!quit' to exit"));
    console.show(Line::Notice("Type '!clear' to start a new dialog"));

    let info = provider.server_info().await;
    console.show(Line::Notice(&format!("Ollama: {}", info.version)));
    console.show(Line::Notice(&format!(
        "Model: {}",
        provider.config().model()
    )));
    let models = info
        .models
        .iter()
        .map(|model| match &model.modified_at {
            Some(modified_at) => format!("{} ({modified_at})", model.name),
            None => model.name.clone(),
        })
        .collect::<Vec<_>>();
    console.show(Line::Notice(&format!(
        "Available models: [{}]",
        models.join(", ")
    )));

    let mut builder = SessionBuilder::with_model_provider(provider)
        .with_history_window(CHAT_HISTORY_WINDOW)
        .with_system_retention(SystemRetention::Keep);
    if let Some(system) = system {
        builder = builder.with_system_prompt(system);
    }
    let mut session = builder.build();

    run_chat(&mut session, console).await;
}

async fn collect_brief(
    provider: OllamaProvider,
    output: &Path,
    review: bool,
    console: &mut dyn Console,
) {
    let mut session = SessionBuilder::with_model_provider(provider.clone())
        .with_system_prompt(brief::system_prompt())
        .with_reasoning_markers(ReasoningMarkers::default())
        .build();

    let outcome = Collector::new(brief::strategy())
        .with_output(output)
        .run(&mut session, console)
        .await;
    let Outcome::Completed(collected) = outcome else {
        return;
    };
    if !review {
        return;
    }
    let Some(record) = collected.record.as_object() else {
        return;
    };

    console.show(Line::Notice(
        "The brief has been sent for review, please wait",
    ));
    let mut review_session = SessionBuilder::with_model_provider(provider)
        .with_system_prompt(brief::review_prompt(record))
        .with_reasoning_markers(ReasoningMarkers::default())
        .build();
    show_reply(&mut review_session, console, brief::REVIEW_REQUEST).await;
}

async fn collect_loan(
    provider: OllamaProvider,
    output: &Path,
    console: &mut dyn Console,
) {
    console.show(Line::Notice("Collecting data for the credit application"));
    let mut session = SessionBuilder::with_model_provider(provider).build();
    let outcome = Collector::new(loan::strategy())
        .with_output(output)
        .run(&mut session, console)
        .await;
    if let Outcome::Completed(_) = outcome {
        console.show(Line::Heading("Application processing complete"));
    }
}

async fn show_reply(
    session: &mut Session,
    console: &mut dyn Console,
    prompt: &str,
) {
    if let Some(reply) = send_with_progress(session, console, prompt).await {
        console.show(Line::Assistant(&reply));
    }
}
