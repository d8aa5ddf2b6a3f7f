//! JANE chat - terminal client for the JANE job assistance chat endpoint

use jane_chat::config::ChatConfig;
use jane_chat::controller::{ClearOutcome, ConversationController, ExchangeOutcome};
use jane_chat::storage::{FileStorage, HistoryStorage, MemoryStorage};
use jane_chat::surface::ChatSurface;
use jane_chat::terminal::{Command, TerminalSurface, HELP_TEXT};
use jane_chat::transport::{HttpTransport, LoggingTransport, StaticCsrfToken};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging on stderr so the transcript on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jane_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = ChatConfig::from_env();
    tracing::info!(
        base_url = %config.base_url,
        history_dir = ?config.history_dir,
        capacity = config.history_capacity.get(),
        "Starting chat session"
    );

    let tokens = Arc::new(StaticCsrfToken::new(config.csrf_token.clone()));
    let transport = LoggingTransport::new(HttpTransport::new(
        &config.base_url,
        config.request_timeout,
        tokens,
    )?);

    let storage: Arc<dyn HistoryStorage> = match &config.history_dir {
        Some(dir) => Arc::new(FileStorage::new(dir)),
        None => Arc::new(MemoryStorage::new()),
    };

    let surface = Arc::new(TerminalSurface::stdout());
    let mut controller = ConversationController::new(
        transport,
        storage,
        Arc::clone(&surface),
        config.controller_config(),
    );
    controller.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => surface.notice(HELP_TEXT),
            Command::Unknown(input) => surface.notice(&format!("Unknown command: {input}")),
            Command::History => surface.list_turns(controller.history().turns(None)),
            Command::Related(id) => surface.list_turns(controller.related_turns(&id)),
            Command::Clear => {
                if controller.clear_conversation().await == ClearOutcome::Cleared {
                    tracing::info!("Conversation cleared");
                }
            }
            Command::Message(text) => {
                surface.set_input_text(&text);
                let mut outcome = controller.submit().await;

                // Confirmation round-trip: the next line is the answer
                while matches!(outcome, ExchangeOutcome::AwaitingConfirmation { .. }) {
                    let answer = lines.next_line().await?.unwrap_or_default();
                    outcome = if matches!(answer.trim(), "y" | "Y" | "yes") {
                        controller.proceed().await
                    } else {
                        controller.cancel().await
                    };
                }
            }
        }
    }

    tracing::info!(turns = controller.history().len(), "Chat session ended");
    Ok(())
}
