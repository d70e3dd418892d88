//! Core framework plugin and engine-facing adaptation for the command layer.
//!
//! Three pieces live here: the core plugin that registers the framework's
//! own (protected) commands, the player session type that carries an
//! in-world caller's identity and reply queue, and the chat router that
//! decides whether an incoming chat line is a command attempt or ordinary
//! chatter to broadcast.

mod chat;
mod core_plugin;
mod session;

pub use chat::{ChatOutcome, ChatRouter};
pub use core_plugin::{register_aliases, restricted_commands, CorePlugin};
pub use session::PlayerSession;
