//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup diagnostics for the environment the bot and panel depend on

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::core::config;

/// Parses a textual log level, falling back to `Info` for unknown values.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file (appended to, created if missing)
/// * `level` - Textual log level such as `info` or `debug`
pub fn init_logger(log_file_path: &str, level: &str) -> Result<()> {
    let level = parse_level(level);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    // Silence chatty HTTP internals unless explicitly tracing
    let log_config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .add_filter_ignore_str("h2")
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(level, log_config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, log_config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the runtime configuration at application startup
///
/// Secrets are never printed, only whether they are present.
pub fn log_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Configuration Check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if config::BOT_TOKEN.is_empty() {
        log::error!("❌ TELEGRAM_BOT_TOKEN: not set (bot listener will not start)");
    } else {
        log::info!("✅ TELEGRAM_BOT_TOKEN: set");
    }

    match config::admin_user_id() {
        Some(id) => log::info!("✅ ADMIN_ID: {}", id),
        None if config::ADMIN_ID.is_empty() => log::error!("❌ ADMIN_ID: not set (admin panel login disabled)"),
        None => log::warn!("⚠️  ADMIN_ID: '{}' is not a numeric Telegram id", config::ADMIN_ID.as_str()),
    }

    match config::STORAGE_CHANNEL_ID.as_deref() {
        Some(channel) => log::info!("✅ STORAGE_CHANNEL_ID: {}", channel),
        None => log::info!("ℹ️  STORAGE_CHANNEL_ID: not set"),
    }

    if config::session_secret_configured() {
        log::info!("✅ SESSION_SECRET: set");
    } else {
        log::warn!("⚠️  SESSION_SECRET: not set, using the development default");
    }

    match config::database_path() {
        Ok(path) => log::info!("✅ Database: sqlite at {}", path),
        Err(e) => log::error!("❌ DATABASE_URL: {}", e),
    }

    log::info!("🌐 Web panel: {}:{}", config::web::HOST.as_str(), *config::web::PORT);
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
