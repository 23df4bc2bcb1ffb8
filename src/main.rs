mod app;
mod event;
mod ui;

/// Version injected at compile time via TSHOP_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("TSHOP_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

use anyhow::{Context, Result};
use app::{App, DEFAULT_RESOURCE};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tshop::api::{ApiClient, CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionContext};
use tshop::config::Config;
use tshop::entity::ViewContext;
use tshop::notification::SharedNotifications;
use tshop::resource::get_resource;

/// Terminal admin console for the shop API
#[derive(Parser, Debug)]
#[command(name = "tshop", version, about, long_about = None)]
struct Args {
    /// Base URL of the admin API (overrides TSHOP_API_URL and the config file)
    #[arg(short, long)]
    api_url: Option<String>,

    /// Resource to open at startup (e.g. products, faqs, order-history)
    #[arg(short, long)]
    resource: Option<String>,

    /// Rows per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Run in read-only mode (block all changes)
    #[arg(long)]
    readonly: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("tshop started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = Config::config_dir() {
        return config_dir.join("tshop.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tshop").join("tshop.log");
    }
    PathBuf::from("tshop.log")
}

fn credential_store() -> Arc<dyn CredentialStore> {
    match FileCredentialStore::default_path() {
        Some(path) => Arc::new(FileCredentialStore::open(path)),
        None => {
            tracing::warn!("No config directory, credentials will not be persisted");
            Arc::new(MemoryCredentialStore::new())
        },
    }
}

/// Build the app state from config, CLI flags and stored credentials
fn initialize(args: &Args) -> Result<App> {
    let mut config = Config::load();
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }

    let api_url = config.effective_api_url(args.api_url.as_deref());
    tracing::info!("Using API: {}", api_url);

    let notifications = SharedNotifications::new(config.notification_manager());
    let session = Arc::new(SessionContext::restore(credential_store()));
    let client = ApiClient::new(
        &api_url,
        config.request_timeout(),
        session,
        Arc::new(notifications.clone()),
    )
    .with_context(|| format!("Cannot use API URL '{}'", api_url))?;

    let ctx = ViewContext {
        client,
        notifier: Arc::new(notifications.clone()),
        settings: config.manager_settings(),
    };

    let initial = args
        .resource
        .clone()
        .or_else(|| config.last_resource.clone())
        .unwrap_or_else(|| DEFAULT_RESOURCE.to_string());
    if get_resource(&initial).is_none() {
        anyhow::bail!("Unknown resource: {}", initial);
    }

    Ok(App::new(ctx, notifications, config, args.readonly, &initial))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    // Fail before touching the terminal
    let mut app = initialize(&args)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = run_app(&mut terminal, &mut app);
    cleanup_terminal(&mut terminal)?;

    if let Err(err) = run_result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn cleanup_terminal<B: Backend + std::io::Write>(terminal: &mut Terminal<B>) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        app.tick();
        terminal.draw(|f| ui::render(f, app))?;

        if event::handle_events(app)? {
            return Ok(());
        }
    }
}
