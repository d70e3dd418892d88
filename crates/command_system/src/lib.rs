//! # Palisade Command System
//!
//! The universal command routing layer for game servers with a plugin
//! architecture. Free-text input arriving from two channels (in-game chat
//! and the operator console) is tokenized with quote awareness, resolved
//! against a registry of commands contributed by independently-installed
//! plugins, and dispatched to the owning callback. Misses are answered with
//! a localized "unknown command" reply instead of silence.
//!
//! ## Core Features
//!
//! - **Two input channels**: chat messages (marked by a `/` or `!` trigger)
//!   and console lines share one dispatch core with channel-specific framing
//! - **Override policy**: core-owned commands can never be replaced, and
//!   restricted names can never be registered at all
//! - **Hot install/uninstall**: plugins contribute and withdraw commands at
//!   runtime; later plugins may shadow earlier ones, with a diagnostic
//! - **Localization**: user-facing replies come from a per-language message
//!   catalog with per-caller language preferences
//!
//! ## Quick Start Example
//!
//! ```rust,no_run
//! use command_system::{
//!     CommandDispatcher, CommandOwner, CommandRegistry, ConsoleCaller, MessageCatalog,
//! };
//! use std::collections::HashSet;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(CommandRegistry::new(HashSet::new()));
//! let messages = Arc::new(MessageCatalog::new());
//!
//! let owner = CommandOwner::plugin("greeter");
//! registry
//!     .register("greet", &owner, Arc::new(|caller, _name, args| {
//!         caller.reply(&format!("Hello, {}!", args.first().map(String::as_str).unwrap_or("world")));
//!         true
//!     }))
//!     .unwrap();
//!
//! let dispatcher = CommandDispatcher::new(registry, messages);
//! let console = ConsoleCaller;
//! assert!(dispatcher.handle_console(&console, "greet everyone"));
//! ```

mod caller;
mod dispatcher;
mod messages;
pub mod plugin;
mod registry;
mod tokenizer;

pub use caller::{CommandCaller, ConsoleCaller, CONSOLE_ID};
pub use dispatcher::CommandDispatcher;
pub use messages::{format_message, CatalogError, MessageCatalog, DEFAULT_LANGUAGE};
pub use plugin::{LogLevel, Plugin, PluginError, ServerContext};
pub use registry::{
    CommandCallback, CommandOwner, CommandRegistry, RegisteredCommand, RegistrationError,
};
pub use tokenizer::tokenize;
