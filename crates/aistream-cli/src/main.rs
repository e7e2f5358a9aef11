mod config;
mod prompt;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use aistream_core::provider::{update_provider_badge, HttpProviderSource, PROVIDERS};
use aistream_core::ui::MessageRole;
use aistream_core::{
    HttpEventTransport, SessionConfig, SessionHooks, SessionUi, StreamError, StreamParams,
    StreamSession,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{CliConfig, Widget};
use terminal::{
    PromptButton, TerminalBadge, TerminalContent, TerminalMessages, TerminalStatus,
    TerminalTyping,
};

#[derive(Parser)]
#[command(name = "aistream")]
#[command(about = "Stream chat, translation, and weather replies from an AI backend")]
#[command(version)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file (defaults to <config dir>/aistream/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stream timeout in milliseconds; 0 or less disables it
    #[arg(long, global = true, allow_negative_numbers = true)]
    timeout_ms: Option<i64>,

    /// Provider to select in the backend session before running the command
    #[arg(long, global = true, value_parser = PROVIDERS)]
    provider: Option<String>,

    /// API key for the remote provider
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant; interactive when no message is given
    Chat {
        message: Option<String>,
    },
    /// Translate text
    Translate {
        /// Target language
        #[arg(long = "to", short = 't')]
        to: String,
        text: String,
    },
    /// Weather report for a city
    Weather {
        city: String,
    },
    /// Show which provider the backend uses
    Provider {
        #[command(subcommand)]
        action: Option<ProviderAction>,
    },
}

#[derive(Subcommand)]
enum ProviderAction {
    /// Select a provider (with `--api-key` for the remote one), then show the badge
    Set {
        #[arg(value_name = "PROVIDER", value_parser = PROVIDERS)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("AISTREAM_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file_config = CliConfig::load(cli.config.as_deref())?;
    let base_url = file_config.base_url(cli.base_url.as_deref());
    info!(base_url = %base_url, "Using backend");

    // The backend keeps the provider choice in its HTTP session
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .context("Failed to build HTTP client")?;
    let source = HttpProviderSource::new(client.clone(), &base_url)?;
    let transport = Arc::new(HttpEventTransport::with_client(client, &base_url)?);

    let provider = match &cli.command {
        Commands::Provider {
            action: Some(ProviderAction::Set { name }),
        } => Some(name.as_str()),
        _ => cli.provider.as_deref(),
    };
    let selection = file_config.provider_selection(provider, cli.api_key.as_deref());
    if let Some(selection) = &selection {
        source
            .select_provider(selection)
            .await
            .with_context(|| format!("Failed to select provider {}", selection.provider))?;
    }

    match cli.command {
        Commands::Chat { message } => {
            let config = file_config.session_config(Widget::Chat, cli.timeout_ms);
            match message {
                Some(message) => {
                    let mut chat = chat_run(config, transport, None)?;
                    chat.stream(StreamParams::message(message), true).await
                }
                None => interactive_chat(config, transport).await,
            }
        }
        Commands::Translate { to, text } => {
            let config = file_config.session_config(Widget::Translate, cli.timeout_ms);
            let mut run = result_run(config, transport)?;
            run.stream(StreamParams::translate(text, to), false).await
        }
        Commands::Weather { city } => {
            let config = file_config.session_config(Widget::Weather, cli.timeout_ms);
            let mut run = result_run(config, transport)?;
            run.stream(StreamParams::weather(city), false).await
        }
        Commands::Provider { .. } => {
            let info = update_provider_badge(&source, &TerminalBadge::new()).await;
            println!("{}", info.provider);
            Ok(())
        }
    }
}

/// A session plus the last error its stream reported
struct Run {
    session: StreamSession,
    failure: Arc<Mutex<Option<StreamError>>>,
}

impl Run {
    fn new(
        config: SessionConfig,
        transport: Arc<HttpEventTransport>,
        ui: SessionUi,
    ) -> Result<Self> {
        let failure = Arc::new(Mutex::new(None));
        let recorded = Arc::clone(&failure);
        let hooks = SessionHooks::new()
            .on_start(|params| debug!("Stream started: {}", params))
            .on_error(move |error| *recorded.lock() = Some(error.clone()))
            .on_end(|| println!());
        let session = StreamSession::new(config, transport, ui, hooks)?;
        Ok(Self { session, failure })
    }

    /// Stream one request to completion; fails if the stream reported an error
    async fn stream(&mut self, params: StreamParams, echo_user: bool) -> Result<()> {
        if echo_user {
            if let StreamParams::Message { message } = &params {
                self.session.add_message(message, MessageRole::User);
            }
        }
        self.session.start_stream(params, None);
        self.session.run_to_end().await;

        let failure = self.failure.lock().take();
        match failure {
            Some(error) if error.is_timeout() => bail!(
                "No reply within {} ms (raise --timeout-ms or set it to 0)",
                self.session.config().timeout_ms
            ),
            Some(error) => bail!("Stream failed: {}", error),
            None => Ok(()),
        }
    }
}

fn base_ui() -> SessionUi {
    SessionUi::new()
        .with_status(Arc::new(TerminalStatus::new()))
        .with_typing(Arc::new(TerminalTyping::new()))
}

/// Translate and weather write into a single result area
fn result_run(config: SessionConfig, transport: Arc<HttpEventTransport>) -> Result<Run> {
    let ui = base_ui().with_result(Arc::new(TerminalContent::new(terminal::stdout())));
    Run::new(config, transport, ui)
}

/// Chat writes each reply into its own message block
fn chat_run(
    config: SessionConfig,
    transport: Arc<HttpEventTransport>,
    button: Option<Arc<PromptButton>>,
) -> Result<Run> {
    let mut ui = base_ui().with_messages(Arc::new(TerminalMessages::new(terminal::stdout())));
    if let Some(button) = button {
        ui = ui.with_submit(button);
    }
    Run::new(config, transport, ui)
}

async fn interactive_chat(
    config: SessionConfig,
    transport: Arc<HttpEventTransport>,
) -> Result<()> {
    let button = Arc::new(PromptButton::new(&config.button_labels.idle));
    let mut chat = chat_run(config, transport, Some(Arc::clone(&button)))?;

    while let Some(line) = prompt::read_line(&button.label()).await? {
        if line.is_empty() {
            continue;
        }
        // The error is already shown in the reply; keep the conversation going
        if let Err(e) = chat.stream(StreamParams::message(line), true).await {
            debug!("{}", e);
        }
    }

    chat.session.destroy();
    Ok(())
}
