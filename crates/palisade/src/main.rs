//! Main application entry point for the Palisade host.
//!
//! Provides CLI interface, configuration loading, logging setup, and the
//! operator console over the command routing core.

use command_system::{CommandDispatcher, CommandRegistry, MessageCatalog};
use plugin_system::PluginManager;
use plugin_teleport::TeleportPlugin;
use server_core::{restricted_commands, CorePlugin};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod config;
mod console;
mod signals;

use cli::CliArgs;
use config::{AppConfig, LoggingSettings};

// ============================================================================
// Logging Setup
// ============================================================================

/// Initialize logging system
fn setup_logging(config: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_format {
        registry
            .with(fmt::layer().json().with_file(false).with_line_number(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_ansi(true).with_file(false).with_line_number(false))
            .init();
    }

    Ok(())
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let mut config = AppConfig::load_from_file(&args.config_path).await?;

    // Apply CLI overrides
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }
    if args.json_logs {
        config.logging.json_format = true;
    }

    if let Err(e) = config.validate() {
        return Err(format!("Configuration validation failed: {}", e).into());
    }

    setup_logging(&config.logging)?;

    info!("🚀 Palisade v{}", env!("CARGO_PKG_VERSION"));
    info!("📂 Config: {}", args.config_path.display());

    // Restricted set: the built-in guard plus whatever the operator added.
    let mut restricted = restricted_commands();
    restricted.extend(config.commands.restricted.iter().cloned());

    let commands = Arc::new(CommandRegistry::new(restricted));
    let messages = Arc::new(MessageCatalog::new());

    for file in &config.commands.language_files {
        match messages.load_language_file(&file.language, &file.path) {
            Ok(count) => info!(
                "Loaded {} message(s) for '{}' from {}",
                count, file.language, file.path
            ),
            Err(e) => warn!("Failed to load language file {}: {}", file.path, e),
        }
    }

    let dispatcher = Arc::new(CommandDispatcher::new(commands.clone(), messages.clone()));
    let manager = Arc::new(PluginManager::new(commands, messages));

    manager
        .install_core(Box::new(CorePlugin::new(manager.roster())))
        .await?;
    manager.install(Box::new(TeleportPlugin::new())).await?;

    let stats = manager.stats().await;
    info!(
        "🔌 {} plugin(s) installed, {} command(s) registered",
        stats.total_plugins, stats.total_commands
    );
    info!("⌨️  Console ready, try 'plugins' or 'version'. Press Ctrl+C to stop.");

    let console_handle = tokio::spawn(console::run_console(dispatcher));

    signals::setup_signal_handlers().await?;
    info!("🛑 Shutdown signal received, stopping...");

    console_handle.abort();
    manager.shutdown_all().await;

    info!("✅ Palisade shutdown complete");
    Ok(())
}
