use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ragchat_core::{Config, Conversation, RagClient};
use tracing::info;

mod app;
mod handler;
mod input;
mod logging;
mod tui;
mod ui;

use app::{App, BackendStatus};
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "ragchat", version)]
#[command(about = "Chat with a RAG question-answering backend from the terminal")]
struct Cli {
    /// Backend base URL (overrides RAGCHAT_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// More log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
    },
    /// Check whether the backend is reachable
    Health,
    /// Ask the backend to load the documents in its data folder
    Load,
    /// Save the backend base URL to the config file
    SetUrl {
        /// e.g. http://localhost:8000
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose)?;

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });
    let api_url = config.api_url(cli.api_url.as_deref());
    let client = RagClient::new(&api_url);
    info!(api_url = client.base_url(), "starting");

    match cli.command {
        None => {
            let conversation = match &config.greeting {
                Some(greeting) => Conversation::with_greeting(greeting),
                None => Conversation::new(),
            };
            run_chat(client, conversation).await
        }
        Some(Commands::Ask { question }) => ask_once(&client, &question).await,
        Some(Commands::Health) => check_health(&client).await,
        Some(Commands::Load) => {
            let status = client.load_documents().await?;
            println!("{}", status);
            Ok(())
        }
        Some(Commands::SetUrl { url }) => {
            if url.trim().is_empty() {
                bail!("URL must not be empty");
            }
            let path = Config::save_api_url(&url)?;
            println!("Saved {} to {}", url.trim(), path.display());
            Ok(())
        }
    }
}

async fn ask_once(client: &RagClient, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        bail!("question must not be empty");
    }

    let answer = client.ask(question).await?;
    println!("{}", answer);
    Ok(())
}

async fn check_health(client: &RagClient) -> Result<()> {
    match client.health().await {
        Ok(message) => {
            println!("{} is up: {}", client.base_url(), message);
            Ok(())
        }
        Err(e) => bail!("{} is unreachable: {}", client.base_url(), e),
    }
}

async fn run_chat(client: RagClient, conversation: Conversation) -> Result<()> {
    let backend_status = match client.health().await {
        Ok(message) => {
            info!(%message, "backend is up");
            BackendStatus::Online
        }
        Err(e) => {
            tracing::warn!(error = %e, "backend health check failed");
            BackendStatus::Offline(e.to_string())
        }
    };

    let mut app = App::new(client, conversation);
    if let BackendStatus::Offline(reason) = &backend_status {
        app.status_message = Some(format!("Backend unreachable: {}", reason));
    }
    app.backend_status = backend_status;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        app.poll_query().await;
    }
    Ok(())
}
