use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use nova_assistant::api::ApiServerBuilder;
use nova_assistant::db::{self, HistoryRepo, ReminderRepo};
use nova_assistant::host::{ConsoleOpener, ConsoleUi, UrlOpener};
use nova_assistant::session::{self, DriverParts, Event};
use nova_assistant::voice::{ConsoleRecognizer, ConsoleSynthesizer};
use nova_assistant::{AssistantBackend, Config, Dispatcher, RemoteClient, SessionDriver};

/// Nova - voice assistant and companion backend
#[derive(Parser)]
#[command(name = "nova", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the backend HTTP server (default)
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Directory of static files for the web front-end
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Interactive terminal session against a backend
    Console {
        /// Backend base URL
        #[arg(long)]
        server: Option<String>,
    },
    /// Show recent commands from the local database
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Show reminders from the local database
    Reminders,
    /// Show preferences, or set one when KEY and VALUE are given
    Preferences {
        key: Option<String>,
        value: Option<String>,
        /// Backend base URL
        #[arg(long)]
        server: Option<String>,
    },
    /// Print the config file location
    ConfigPath,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,nova_assistant=info",
        1 => "info,nova_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load();
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve {
        port: None,
        static_dir: None,
    }) {
        Command::Serve { port, static_dir } => serve(config, port, static_dir).await,
        Command::Console { server } => console(config, server).await,
        Command::History { limit } => show_history(&config, limit),
        Command::Reminders => show_reminders(&config),
        Command::Preferences { key, value, server } => {
            preferences(config, server, key, value).await
        }
        Command::ConfigPath => {
            match nova_assistant::config::file::config_file_path() {
                Some(path) => println!("{}", path.display()),
                None => anyhow::bail!("could not determine config directory"),
            }
            Ok(())
        }
    }
}

/// Run the backend until interrupted
async fn serve(config: Config, port: Option<u16>, static_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let port = port.unwrap_or(config.server.port);
    let static_dir = static_dir.or_else(|| config.server.static_dir.clone());

    tracing::info!(port, db = %config.db_path().display(), "starting nova backend");

    let pool = db::init(config.db_path())?;
    let server = ApiServerBuilder::new(pool)
        .port(port)
        .llm(config.llm.clone())
        .static_dir(static_dir)
        .build();

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutdown requested"),
    }

    Ok(())
}

fn client(config: &Config, server: Option<String>) -> anyhow::Result<RemoteClient> {
    let mut client_config = config.client.clone();
    if let Some(server) = server {
        client_config.server_url = server;
    }

    let opener: Arc<dyn UrlOpener> = Arc::new(ConsoleOpener);
    Ok(RemoteClient::new(&client_config, opener)?)
}

/// Interactive session: typed lines stand in for speech
async fn console(config: Config, server: Option<String>) -> anyhow::Result<()> {
    let backend = Arc::new(client(&config, server)?);
    let (tx, rx) = session::channel();

    let recognizer = ConsoleRecognizer::new(tx.clone());
    let input = recognizer.input();

    let parts = DriverParts {
        dispatcher: Dispatcher::new()?,
        backend,
        ui: Arc::new(ConsoleUi::new()),
        opener: Arc::new(ConsoleOpener),
        recognizer: Box::new(recognizer),
        synthesizer: Box::new(ConsoleSynthesizer::new(tx.clone())),
    };
    let driver = SessionDriver::new(parts, &config.voice, (tx.clone(), rx));

    println!("Press Enter to start listening, type what you would say, then Enter.");
    println!("/feedback <text> sends feedback, /quit exits.\n");

    let reader = tokio::spawn(input.run(BufReader::new(tokio::io::stdin())));
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(Event::Shutdown);
        }
    });

    driver.run().await;

    interrupt.abort();
    reader.abort();
    Ok(())
}

fn show_history(config: &Config, limit: usize) -> anyhow::Result<()> {
    let repo = HistoryRepo::new(db::init(config.db_path())?);
    let entries = repo.recent(limit)?;

    if entries.is_empty() {
        println!("No commands recorded.");
    }
    for entry in entries {
        println!(
            "{}  {}\n    → {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.command,
            entry.response.as_deref().unwrap_or("(no response)")
        );
    }
    Ok(())
}

fn show_reminders(config: &Config) -> anyhow::Result<()> {
    let repo = ReminderRepo::new(db::init(config.db_path())?);
    let reminders = repo.list()?;

    if reminders.is_empty() {
        println!("No reminders set.");
    }
    for reminder in reminders {
        println!("{}  {}", reminder.created_at.format("%Y-%m-%d %H:%M"), reminder.text);
    }
    Ok(())
}

async fn preferences(
    config: Config,
    server: Option<String>,
    key: Option<String>,
    value: Option<String>,
) -> anyhow::Result<()> {
    let client = client(&config, server)?;

    if let Some(key) = key {
        client.set_preference(&key, value.as_deref()).await?;
        println!("Saved {key}");
        return Ok(());
    }

    for (key, value) in client.preferences().await? {
        println!("{key} = {}", value.as_deref().unwrap_or("(unset)"));
    }
    Ok(())
}
