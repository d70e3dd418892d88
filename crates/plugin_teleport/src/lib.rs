//! Sample teleport plugin.
//!
//! A small, ordinary (non-core) plugin showing what command contribution
//! looks like from the outside: it registers `tp` and `tp.here`, brings its
//! own message templates, and validates argument counts in the callbacks.

use async_trait::async_trait;
use command_system::{
    format_message, CommandCallback, CommandOwner, Plugin, PluginError, ServerContext,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Teleport commands for in-world participants.
pub struct TeleportPlugin;

impl TeleportPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TeleportPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for TeleportPlugin {
    fn name(&self) -> &str {
        "teleport"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn register_commands(
        &mut self,
        owner: &CommandOwner,
        context: Arc<dyn ServerContext>,
    ) -> Result<(), PluginError> {
        let messages = context.messages();
        messages.register_messages(
            command_system::DEFAULT_LANGUAGE,
            HashMap::from([
                (
                    "TeleportUsage".to_string(),
                    "Usage: /tp <target>".to_string(),
                ),
                (
                    "TeleportDone".to_string(),
                    "Teleporting to {0}".to_string(),
                ),
                (
                    "TeleportSummoned".to_string(),
                    "Summoning {0} to you".to_string(),
                ),
            ]),
        );

        let registry = context.commands();

        let tp_messages = messages.clone();
        let tp: CommandCallback = Arc::new(move |caller, _, args| {
            match args {
                [target] => {
                    let template = tp_messages.get_message("TeleportDone", caller.id());
                    caller.reply(&format_message(&template, &[target.as_str()]));
                }
                _ => {
                    let template = tp_messages.get_message("TeleportUsage", caller.id());
                    caller.reply(&template);
                }
            }
            true
        });
        registry.register("tp", owner, tp)?;

        let here_messages = messages.clone();
        let tp_here: CommandCallback = Arc::new(move |caller, _, args| {
            match args {
                [target] => {
                    let template = here_messages.get_message("TeleportSummoned", caller.id());
                    caller.reply(&format_message(&template, &[target.as_str()]));
                }
                _ => {
                    caller.reply("Usage: /tp.here <target>");
                }
            }
            true
        });
        registry.register("tp.here", owner, tp_here)?;

        Ok(())
    }

    async fn on_init(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        info!("Teleport plugin ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_system::{CommandCaller, CommandDispatcher, CommandRegistry, MessageCatalog};
    use parking_lot::Mutex;
    use plugin_system::PluginManager;
    use std::collections::HashSet;

    struct RecordingCaller {
        replies: Mutex<Vec<String>>,
    }

    impl RecordingCaller {
        fn new() -> Self {
            Self {
                replies: Mutex::new(Vec::new()),
            }
        }

        fn replies(&self) -> Vec<String> {
            self.replies.lock().clone()
        }
    }

    impl CommandCaller for RecordingCaller {
        fn id(&self) -> &str {
            "player_1"
        }

        fn name(&self) -> &str {
            "Player One"
        }

        fn reply(&self, message: &str) {
            self.replies.lock().push(message.to_string());
        }
    }

    async fn dispatcher_with_plugin() -> CommandDispatcher {
        let commands = Arc::new(CommandRegistry::new(HashSet::from(["".to_string()])));
        let messages = Arc::new(MessageCatalog::new());
        let manager = PluginManager::new(commands.clone(), messages.clone());
        manager.install(Box::new(TeleportPlugin::new())).await.unwrap();
        CommandDispatcher::new(commands, messages)
    }

    #[tokio::test]
    async fn tp_with_target_confirms() {
        let dispatcher = dispatcher_with_plugin().await;
        let caller = RecordingCaller::new();

        assert!(dispatcher.handle_chat(&caller, "/tp spawn"));
        assert_eq!(caller.replies(), vec!["Teleporting to spawn"]);
    }

    #[tokio::test]
    async fn tp_without_target_replies_usage() {
        let dispatcher = dispatcher_with_plugin().await;
        let caller = RecordingCaller::new();

        assert!(dispatcher.handle_chat(&caller, "/tp"));
        assert_eq!(caller.replies(), vec!["Usage: /tp <target>"]);
    }

    #[tokio::test]
    async fn quoted_target_stays_one_argument() {
        let dispatcher = dispatcher_with_plugin().await;
        let caller = RecordingCaller::new();

        assert!(dispatcher.handle_chat(&caller, r#"/tp "old camp""#));
        assert_eq!(caller.replies(), vec!["Teleporting to old camp"]);
    }

    #[tokio::test]
    async fn namespaced_command_dispatches() {
        let dispatcher = dispatcher_with_plugin().await;
        let caller = RecordingCaller::new();

        assert!(dispatcher.handle_chat(&caller, "/tp.here friend"));
        assert_eq!(caller.replies(), vec!["Summoning friend to you"]);
    }
}
