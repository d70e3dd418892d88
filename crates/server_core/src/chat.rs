//! Routing of incoming chat lines.
//!
//! The engine's chat hook hands every message here. Command attempts go to
//! the dispatcher; everything else is ordinary chatter the engine should
//! broadcast, logged in the server's chat log format.

use command_system::{CommandCaller, CommandDispatcher};
use std::sync::Arc;
use tracing::info;

/// What became of a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Degenerate message (empty or a single character); suppressed.
    Ignored,
    /// Consumed as a command attempt, replies already sent.
    Command,
    /// Ordinary chat; the engine should broadcast it.
    Broadcast,
}

/// Adapter between the engine's chat hook and the command dispatcher.
pub struct ChatRouter {
    dispatcher: Arc<CommandDispatcher>,
}

impl ChatRouter {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Routes one chat line from `caller`.
    pub fn route(&self, caller: &dyn CommandCaller, message: &str) -> ChatOutcome {
        let trimmed = message.trim();
        if trimmed.chars().count() <= 1 {
            return ChatOutcome::Ignored;
        }

        if self.dispatcher.handle_chat(caller, message) {
            return ChatOutcome::Command;
        }

        info!("[Chat] {}: {}", caller.name(), trimmed);
        ChatOutcome::Broadcast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_system::{CommandOwner, CommandRegistry, MessageCatalog};
    use std::collections::HashSet;

    struct SilentCaller;

    impl CommandCaller for SilentCaller {
        fn id(&self) -> &str {
            "p1"
        }

        fn name(&self) -> &str {
            "Silent"
        }

        fn reply(&self, _message: &str) {}
    }

    fn router() -> ChatRouter {
        let registry = Arc::new(CommandRegistry::new(HashSet::from(["".to_string()])));
        let owner = CommandOwner::plugin("greeter");
        registry
            .register("greet", &owner, Arc::new(|_, _, _| true))
            .unwrap();

        let dispatcher = Arc::new(CommandDispatcher::new(
            registry,
            Arc::new(MessageCatalog::new()),
        ));
        ChatRouter::new(dispatcher)
    }

    #[test]
    fn tiny_messages_are_ignored() {
        let router = router();
        assert_eq!(router.route(&SilentCaller, ""), ChatOutcome::Ignored);
        assert_eq!(router.route(&SilentCaller, " x "), ChatOutcome::Ignored);
        assert_eq!(router.route(&SilentCaller, "/"), ChatOutcome::Ignored);
    }

    #[test]
    fn commands_are_consumed() {
        let router = router();
        assert_eq!(router.route(&SilentCaller, "/greet all"), ChatOutcome::Command);
        // Unknown commands are still consumed; the caller got a reply.
        assert_eq!(router.route(&SilentCaller, "!fly"), ChatOutcome::Command);
    }

    #[test]
    fn ordinary_chat_broadcasts() {
        let router = router();
        assert_eq!(
            router.route(&SilentCaller, "good morning everyone"),
            ChatOutcome::Broadcast
        );
    }
}
