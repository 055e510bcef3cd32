//! Quill TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # Chat about a local document against the default backend
//! quill-tui --document report.txt
//!
//! # Another backend, logging to a file
//! quill-tui --url ws://chat.internal:8000/ws/chat --log-file quill.log
//! ```

use std::{fs::File, path::PathBuf, sync::Arc};

use clap::Parser;
use quill_app::{PersistPolicy, RedbStore, Runtime, TextDocument};
use quill_client::SessionConfig;
use quill_core::DEFAULT_WEBSOCKET_URL;
use quill_proto::Correlation;
use quill_tui::{SystemEnv, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Quill terminal chat assistant
#[derive(Parser, Debug)]
#[command(name = "quill-tui")]
#[command(about = "Terminal client for the Quill chat assistant")]
#[command(version)]
struct Args {
    /// WebSocket endpoint of the chat backend
    #[arg(short, long, env = "QUILL_WEBSOCKET_URL", default_value = DEFAULT_WEBSOCKET_URL)]
    url: String,

    /// Plain-text document to select passages from (paragraphs split on
    /// blank lines)
    #[arg(short, long)]
    document: Option<PathBuf>,

    /// Where preferences are stored
    #[arg(long, default_value = "quill-state.redb")]
    state: PathBuf,

    /// Also persist the transcript
    #[arg(long)]
    persist_transcript: bool,

    /// Send "agent" as the request mode when agent mode is on
    #[arg(long)]
    send_agent_mode: bool,

    /// Chat identifier sent with every request
    #[arg(long)]
    chat_id: Option<String>,

    /// Document identifier sent with every request
    #[arg(long)]
    document_id: Option<String>,

    /// User identifier sent with every request
    #[arg(long)]
    user_id: Option<String>,

    /// Write logs to this file. The terminal is busy, so nothing is logged
    /// without it.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        let mut correlation = Correlation::default();
        if let Some(id) = &self.chat_id {
            correlation.chat_id.clone_from(id);
        }
        if let Some(id) = &self.document_id {
            correlation.document_id.clone_from(id);
        }
        if let Some(id) = &self.user_id {
            correlation.user_id.clone_from(id);
        }

        SessionConfig {
            url: self.url.clone(),
            correlation,
            encode_agent_mode: self.send_agent_mode,
            ..SessionConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
        let writer = Arc::new(File::create(path)?);
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(filter)
            .init();
    }

    tracing::info!(url = %args.url, "Quill TUI starting");

    let document = match &args.document {
        Some(path) => TextDocument::from_text(&std::fs::read_to_string(path)?),
        None => TextDocument::new(),
    };

    let store = RedbStore::open(&args.state)?;
    let policy = if args.persist_transcript {
        PersistPolicy::WithTranscript
    } else {
        PersistPolicy::PreferencesOnly
    };

    let driver = TerminalDriver::new(document)?;
    let runtime = Runtime::new(driver, SystemEnv::new(), args.session_config(), store, policy);

    Ok(runtime.run().await?)
}
