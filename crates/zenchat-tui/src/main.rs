use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use zenchat_core::{segment, ChatClient, Config};

mod app;
mod handler;
mod logging;
mod transcript;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "zenchat", version)]
#[command(about = "Terminal chat client for the ZenAI chat endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Chat endpoint URL (defaults to the config file, then http://localhost:5000/chat)
    #[arg(long, env = "ZENCHAT_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log file for interactive sessions
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single message and print the reply
    Ask {
        /// Message to send
        message: String,
    },
    /// Print the prose/code segmentation of a message as JSON
    Segment {
        /// File to read (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Show or change the saved configuration
    Config {
        /// Save a new default chat endpoint
        #[arg(long, value_name = "URL")]
        set_endpoint: Option<String>,
        /// Save a new default request timeout
        #[arg(long, value_name = "SECS")]
        set_timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
            logging::init_file_logging(cli.verbose, &log_path)?;
            let client = build_client(&cli)?;
            run_tui(client).await
        }
        Some(Commands::Ask { ref message }) => {
            logging::init_stderr_logging(cli.verbose);
            let client = build_client(&cli)?;
            ask(&client, message).await
        }
        Some(Commands::Segment { ref file }) => {
            logging::init_stderr_logging(cli.verbose);
            print_segments(file.as_deref())
        }
        Some(Commands::Config { ref set_endpoint, set_timeout }) => {
            logging::init_stderr_logging(cli.verbose);
            configure(set_endpoint.clone(), set_timeout)
        }
    }
}

fn build_client(cli: &Cli) -> Result<ChatClient> {
    let config = Config::load()?;
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    let timeout = config.resolve_timeout(cli.timeout);

    info!(%endpoint, timeout_secs = timeout.as_secs(), "using chat endpoint");
    ChatClient::with_timeout(&endpoint, timeout).context("configuring chat client")
}

async fn ask(client: &ChatClient, message: &str) -> Result<()> {
    let reply = client
        .send(message)
        .await
        .with_context(|| format!("no reply from {}", client.endpoint()))?;

    print!("{}", transcript::render_plain(&segment(&reply)));
    Ok(())
}

fn print_segments(file: Option<&std::path::Path>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    println!("{}", serde_json::to_string_pretty(&segment(&text))?);
    Ok(())
}

fn configure(endpoint: Option<String>, timeout_secs: Option<u64>) -> Result<()> {
    let mut config = Config::load()?;

    if config.update(endpoint, timeout_secs)? {
        config.save().context("saving config")?;
        info!("config saved");
    }

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

async fn run_tui(client: ChatClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(client);
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    info!("session started");

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        app.poll_request().await;
    }

    info!(messages = app.conversation.len(), "session ended");
    Ok(())
}
