//! The framework's own plugin.
//!
//! Registers the built-in commands under a core owner so no later plugin can
//! replace them, and supplies the restricted name set the registry is built
//! with.

use async_trait::async_trait;
use command_system::{
    CommandCallback, CommandOwner, CommandRegistry, Plugin, PluginError, ServerContext,
};
use plugin_system::PluginRoster;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Names no plugin may ever register. The empty string keeps empty command
/// names out of the registry entirely.
const RESTRICTED_COMMANDS: &[&str] = &[""];

/// The restricted name set handed to [`CommandRegistry::new`].
pub fn restricted_commands() -> HashSet<String> {
    RESTRICTED_COMMANDS.iter().map(|s| s.to_string()).collect()
}

/// Registers `callback` under every alias, logging and skipping any alias
/// the override policy rejects. A lost alias is fatal to that alias only,
/// not to the plugin registering it.
pub fn register_aliases(
    registry: &CommandRegistry,
    owner: &CommandOwner,
    aliases: &[&str],
    callback: CommandCallback,
) {
    for alias in aliases {
        if let Err(e) = registry.register(alias, owner, callback.clone()) {
            warn!("Skipping command alias '{}': {}", alias, e);
        }
    }
}

/// The core framework plugin.
///
/// Installed via `PluginManager::install_core`, so everything it registers
/// is protected from override. Each command is reachable under a namespaced
/// alias (`palisade.version`), a shorthand (`p.version`), and its bare name
/// (`version`).
pub struct CorePlugin {
    roster: Arc<PluginRoster>,
}

impl CorePlugin {
    pub fn new(roster: Arc<PluginRoster>) -> Self {
        Self { roster }
    }
}

#[async_trait]
impl Plugin for CorePlugin {
    fn name(&self) -> &str {
        "palisade_core"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn register_commands(
        &mut self,
        owner: &CommandOwner,
        context: Arc<dyn ServerContext>,
    ) -> Result<(), PluginError> {
        let registry = context.commands();

        let version: CommandCallback = Arc::new(|caller, _, _| {
            caller.reply(&format!("Palisade v{}", env!("CARGO_PKG_VERSION")));
            true
        });
        register_aliases(
            &registry,
            owner,
            &["palisade.version", "p.version", "version"],
            version,
        );

        let roster = self.roster.clone();
        let plugins: CommandCallback = Arc::new(move |caller, _, _| {
            let entries = roster.snapshot();
            let mut lines = vec![format!("Installed plugins ({}):", entries.len())];
            for entry in entries {
                lines.push(format!(
                    "  {} v{} ({} command(s)){}",
                    entry.name,
                    entry.version,
                    entry.command_count,
                    if entry.core { " [core]" } else { "" }
                ));
            }
            caller.reply(&lines.join("\n"));
            true
        });
        register_aliases(
            &registry,
            owner,
            &["palisade.plugins", "p.plugins", "plugins"],
            plugins,
        );

        let messages = context.messages();
        let lang: CommandCallback = Arc::new(move |caller, _, args| {
            match args.first() {
                Some(language) => {
                    messages.set_language(caller.id(), language);
                    let template = messages.get_message("LanguageSet", caller.id());
                    caller.reply(&command_system::format_message(
                        &template,
                        &[language.as_str()],
                    ));
                }
                None => {
                    let current = messages.language_of(caller.id());
                    let template = messages.get_message("LanguageCurrent", caller.id());
                    caller.reply(&command_system::format_message(
                        &template,
                        &[current.as_str()],
                    ));
                }
            }
            true
        });
        register_aliases(
            &registry,
            owner,
            &["palisade.lang", "p.lang", "lang"],
            lang,
        );

        Ok(())
    }
}
