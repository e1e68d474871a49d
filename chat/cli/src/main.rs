//! Alpha Chat - Command-Line Front End
//!
//! Streams assistant replies to the terminal as they arrive.
//!
//! # Usage
//!
//! ```bash
//! # One question, scripted responder
//! alpha-chat ask "How should I plan my business strategy?"
//!
//! # Interactive session against a hosted endpoint
//! alpha-chat --producer http --endpoint http://localhost:3000/api/chat chat
//!
//! # Dashboard listing for the demo user
//! alpha-chat sessions --demo
//!
//! # Verbose logging
//! RUST_LOG=debug alpha-chat ask hi
//! ```
//!
//! # Signals
//!
//! - `SIGINT` during a reply: cancel the reply, keep the session
//! - `SIGINT` at the prompt: exit

mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info};

use alpha_chat_core::{
    cancellation, config::load_config_from_path, dashboard::sessions_for, default_config_path,
    producer_from_config, AuthService, ChatConfig, ChatSession, ConfigOverrides,
    InMemorySessionStore, ProducerKind, StreamOutcome, UserDirectory,
};

use render::TerminalPresenter;

/// Alpha Chat - streaming chat client
#[derive(Parser, Debug)]
#[command(name = "alpha-chat")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "ALPHA_CHAT_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Event producer (scripted or http)
    #[arg(long, value_name = "KIND", global = true)]
    producer: Option<ProducerKind>,

    /// Chat endpoint URL for the http producer
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// Delay between scripted words in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    word_delay_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask one question and stream the reply
    Ask {
        /// The message to send
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// Interactive chat on stdin (/clear, /quit)
    Chat,

    /// Sign in and list dashboard sessions
    Sessions {
        /// Account email
        #[arg(long, requires = "password", conflicts_with = "demo")]
        email: Option<String>,

        /// Account password
        #[arg(long, requires = "email")]
        password: Option<String>,

        /// Use the demo account
        #[arg(long)]
        demo: bool,
    },
}

/// Initialize logging; stdout is reserved for replies
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("alpha_chat={level},alpha_chat_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}

/// Resolve configuration: file, environment, then flags
fn resolve_config(args: &Args) -> Result<ChatConfig> {
    if let Some(ref path) = args.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(producer) = args.producer {
        overrides = overrides.with_producer(producer);
    }
    if let Some(ref endpoint) = args.endpoint {
        overrides = overrides.with_endpoint(endpoint.clone());
    }
    if let Some(ms) = args.word_delay_ms {
        overrides = overrides.with_word_delay_ms(ms);
    }
    overrides.apply(&mut config);

    config.validate().context("Invalid configuration")?;
    debug!(source = %config.source(), producer = %config.producer, "configuration resolved");
    Ok(config)
}

fn new_session(config: &ChatConfig) -> Result<ChatSession> {
    let producer = producer_from_config(config).context("Failed to create event producer")?;
    Ok(ChatSession::new(producer, config))
}

/// Run one turn, cancelling it on Ctrl-C
async fn run_turn(session: &mut ChatSession, input: &str) -> Result<StreamOutcome> {
    let (handle, cancel) = cancellation();
    let watcher = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let mut presenter = TerminalPresenter::new(session.fallback_message().to_string());
    let outcome = session.submit(input, &mut presenter, cancel).await;
    watcher.abort();

    Ok(outcome?)
}

async fn ask(config: &ChatConfig, prompt: &str) -> Result<()> {
    let mut session = new_session(config)?;
    let outcome = run_turn(&mut session, prompt).await?;
    if !outcome.status.is_done() {
        bail!("reply {}", outcome.status.label());
    }
    Ok(())
}

async fn chat(config: &ChatConfig) -> Result<()> {
    let mut session = new_session(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Connected to Alpha AI ({}). Type /quit to leave.", config.producer);
    loop {
        render::prompt()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear()?;
                eprintln!("(history cleared)");
                continue;
            }
            input => {
                run_turn(&mut session, input).await?;
            }
        }
    }

    info!(turns = session.turns_completed(), "chat ended");
    Ok(())
}

fn sessions(email: Option<&str>, password: Option<&str>, demo: bool) -> Result<()> {
    let auth = AuthService::new(
        Arc::new(UserDirectory::with_seed_users()),
        Arc::new(InMemorySessionStore::new()),
    );

    let signed_in = match (email, password) {
        (Some(email), Some(password)) if !demo => auth
            .sign_in(email, password)
            .with_context(|| format!("Sign-in failed for {email}"))?,
        _ => auth.demo(),
    };

    let now = Utc::now();
    println!("Welcome back, {}!", signed_in.user.name);
    for summary in sessions_for(&signed_in.user, now) {
        println!(
            "  {:<32} {:>16}\n    {}",
            summary.title,
            summary.relative_label(now),
            summary.last_message
        );
    }

    auth.sign_out();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = resolve_config(&args)?;

    match &args.command {
        Command::Ask { prompt } => ask(&config, &prompt.join(" ")).await,
        Command::Chat => chat(&config).await,
        Command::Sessions {
            email,
            password,
            demo,
        } => sessions(email.as_deref(), password.as_deref(), *demo),
    }
}
