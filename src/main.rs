use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;

use fileshelf::broadcast::{BroadcastSender, TelegramBroadcastSender};
use fileshelf::cli::{Cli, Commands};
use fileshelf::core::{config, init_logger, log_configuration, AppError};
use fileshelf::storage::{create_pool, DbPool};
use fileshelf::telegram::bot::supervise_bot;
use fileshelf::telegram::create_bot;
use fileshelf::web::{run_web_server, ConfigStatus, WebState};

/// Entry point: runs the bot listener, the web panel, or both.
///
/// # Errors
/// Returns an error if logging, the database or a requested service fails
/// to start.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load .env before any configuration value is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH, &config::LOG_LEVEL)?;

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    log_configuration();

    let db_path = config::database_path()?;
    let db_pool = Arc::new(
        create_pool(&db_path).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Migrate => {
            log::info!("Migrations applied");
            Ok(())
        }
        Commands::Bot => run_bot_only(db_pool).await,
        Commands::Web => run_web_server(web_state(db_pool)?).await,
        Commands::Run => run_all(db_pool).await,
    }
}

/// Runs only the bot listener.
///
/// A configuration error is returned to `main`, which exits non-zero.
async fn run_bot_only(db_pool: Arc<DbPool>) -> Result<()> {
    supervise_bot(db_pool).await.map_err(bot_start_error)
}

fn bot_start_error(e: AppError) -> anyhow::Error {
    log::error!("Bot listener stopped: {}", e);
    anyhow::Error::from(e).context("bot listener failed")
}

/// Bot listener and web panel side by side.
///
/// A bot configuration error leaves the panel running so the admin can
/// still inspect the catalog.
async fn run_all(db_pool: Arc<DbPool>) -> Result<()> {
    let state = web_state(Arc::clone(&db_pool))?;

    let bot_task = tokio::spawn(async move {
        match supervise_bot(db_pool).await {
            Ok(()) => log::info!("Bot listener stopped"),
            Err(e @ AppError::Config(_)) => log::error!("Bot listener not started: {}", e),
            Err(e) => log::error!("Bot listener failed: {}", e),
        }
    });

    let result = run_web_server(state).await;
    bot_task.abort();
    result
}

fn web_state(db_pool: Arc<DbPool>) -> Result<WebState> {
    let broadcaster: Option<Arc<dyn BroadcastSender>> = if config::BOT_TOKEN.is_empty() {
        log::warn!("TELEGRAM_BOT_TOKEN not set: broadcasts are disabled");
        None
    } else {
        let bot = create_bot(&config::BOT_TOKEN)?;
        Some(Arc::new(TelegramBroadcastSender::new(bot)))
    };

    if !config::session_secret_configured() {
        log::warn!("SESSION_SECRET not set: using the development secret");
    }

    Ok(
        WebState::new(db_pool, config::SESSION_SECRET.as_str(), config::ADMIN_ID.as_str(), broadcaster)
            .with_config_status(ConfigStatus::from_env()),
    )
}
