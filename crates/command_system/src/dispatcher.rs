//! Command dispatch for the chat and console channels.
//!
//! Both channels share one core: tokenize, look up, invoke, and answer a
//! miss with a localized "unknown command" reply. The framing differs: chat
//! lines only count as command attempts when they start with a trigger
//! character, while the console always attempts dispatch.

use crate::caller::CommandCaller;
use crate::messages::{format_message, MessageCatalog};
use crate::registry::CommandRegistry;
use crate::tokenizer::tokenize;
use std::sync::Arc;
use tracing::debug;

/// Message catalog key for the dispatch-miss reply.
const UNKNOWN_COMMAND: &str = "UnknownCommand";

/// Entry point for free-text input from the chat and console channels.
///
/// Owns shared handles to the registry and the message catalog; created at
/// framework start and dropped at framework stop.
#[derive(Debug)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
    messages: Arc<MessageCatalog>,
}

impl CommandDispatcher {
    /// Creates a dispatcher over the given registry and catalog.
    pub fn new(registry: Arc<CommandRegistry>, messages: Arc<MessageCatalog>) -> Self {
        Self { registry, messages }
    }

    /// The registry this dispatcher resolves against.
    pub fn registry(&self) -> Arc<CommandRegistry> {
        self.registry.clone()
    }

    /// Handles a chat line.
    ///
    /// Returns `false` when the message is not a command attempt: empty or a
    /// single character once trimmed, or not starting with `/` or `!`. Such
    /// messages are never tokenized here; routing them to chat broadcast is
    /// the hook layer's concern. Both trigger characters are synonyms; the
    /// message is rewritten to the canonical `/` form before parsing.
    ///
    /// Returns `true` when the attempt was consumed: either a callback
    /// handled it, or the caller was told the command is unknown.
    pub fn handle_chat(&self, caller: &dyn CommandCaller, message: &str) -> bool {
        let trimmed = message.trim();
        if trimmed.chars().count() <= 1 {
            return false;
        }

        let Some(first) = trimmed.chars().next() else {
            return false;
        };
        if first != '/' && first != '!' {
            return false;
        }

        let canonical = format!("/{}", &trimmed[1..]);
        self.dispatch(caller, &canonical[1..])
    }

    /// Handles a console line.
    ///
    /// The console always attempts dispatch; a single leading `/` is
    /// tolerated and stripped. Returns `false` only when the line tokenizes
    /// to nothing.
    pub fn handle_console(&self, caller: &dyn CommandCaller, message: &str) -> bool {
        let trimmed = message.trim();
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        self.dispatch(caller, body)
    }

    /// Shared dispatch core, past channel framing.
    ///
    /// Exactly one callback runs per call, and the unknown-command reply is
    /// emitted at most once. A callback declining (`false`) is
    /// indistinguishable from a miss at this boundary (there is only ever
    /// one candidate per name), so both fall through to the reply.
    fn dispatch(&self, caller: &dyn CommandCaller, body: &str) -> bool {
        let tokens = tokenize(body);
        let Some((name, args)) = tokens.split_first() else {
            return false;
        };

        debug!("Dispatching '{}' for {}", name, caller.name());

        match self.registry.dispatch(caller, name, args) {
            Some(true) => true,
            Some(false) | None => {
                let template = self.messages.get_message(UNKNOWN_COMMAND, caller.id());
                caller.reply(&format_message(&template, &[name.as_str()]));
                true
            }
        }
    }
}
