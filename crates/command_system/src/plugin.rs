//! Plugin-facing traits and errors.
//!
//! Plugins contribute commands during a registration phase, then run through
//! an async init/shutdown lifecycle. The server context is the narrow window
//! a plugin gets onto the framework: the command registry, the message
//! catalog, and the logging sink.

use crate::messages::MessageCatalog;
use crate::registry::{CommandOwner, CommandRegistry, RegistrationError};
use async_trait::async_trait;
use std::sync::Arc;

/// Severity levels for plugin logging.
///
/// Routed through the server's logging sink so plugin output shares the
/// host's formatting and filtering.
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    /// Critical errors that may affect system stability
    Error,
    /// Warning conditions that should be investigated
    Warn,
    /// General informational messages
    Info,
    /// Detailed information for debugging
    Debug,
    /// Very detailed trace information
    Trace,
}

/// Errors that can occur during plugin lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Plugin initialization failed during startup
    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),
    /// Error occurred during plugin execution
    #[error("Plugin execution error: {0}")]
    ExecutionError(String),
    /// Requested plugin was not found
    #[error("Plugin not found: {0}")]
    NotFound(String),
    /// A plugin with the same name is already installed
    #[error("Plugin {0} is already installed")]
    AlreadyInstalled(String),
    /// A command registration was rejected by the override policy
    #[error("Command registration rejected: {0}")]
    Registration(#[from] RegistrationError),
}

/// The framework services a plugin may reach.
pub trait ServerContext: Send + Sync {
    /// The command registry plugins register into.
    fn commands(&self) -> Arc<CommandRegistry>;

    /// The message catalog for localized, user-facing text.
    fn messages(&self) -> Arc<MessageCatalog>;

    /// Logs a message through the server's logging sink.
    fn log(&self, level: LogLevel, message: &str);
}

/// A plugin that contributes commands to the framework.
///
/// # Lifecycle
///
/// 1. **Registration**: `register_commands()` is called with the plugin's
///    owner handle; every command and message set the plugin provides should
///    be contributed here.
/// 2. **Initialization**: `on_init()` runs once registration succeeded.
/// 3. **Operation**: callbacks fire as input is dispatched.
/// 4. **Shutdown**: `on_shutdown()` runs during uninstall, after the
///    plugin's commands have already been withdrawn from the registry.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Returns the name of this plugin. Must be stable and unique; it keys
    /// the installed-plugin table and names the command owner.
    fn name(&self) -> &str;

    /// Returns the version string of this plugin.
    fn version(&self) -> &str;

    /// Contributes commands (and message sets) to the framework.
    ///
    /// `owner` is the handle the framework minted for this plugin; pass it
    /// to every [`CommandRegistry::register`] call so ownership, shadowing
    /// diagnostics, and uninstall-time withdrawal all attribute correctly.
    ///
    /// A rejected registration is fatal to that command, not necessarily to
    /// the plugin: return the error to abort installation, or log and skip
    /// to proceed without the command.
    async fn register_commands(
        &mut self,
        owner: &CommandOwner,
        context: Arc<dyn ServerContext>,
    ) -> Result<(), PluginError>;

    /// Initialize the plugin once its commands are registered.
    async fn on_init(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(()) // Default implementation does nothing
    }

    /// Shutdown the plugin gracefully.
    ///
    /// Called during uninstall or framework stop. The plugin's commands are
    /// already gone from the registry by the time this runs, so no dispatch
    /// can race into a torn-down plugin.
    async fn on_shutdown(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(()) // Default implementation does nothing
    }
}
