//! Plugin lifecycle management for the command framework.
//!
//! Provides hot install/uninstall of command-owning plugins, the server
//! context handed to them, and a synchronously readable roster of what is
//! installed.

use async_trait::async_trait;
use command_system::{
    CommandOwner, CommandRegistry, LogLevel, MessageCatalog, Plugin, PluginError, ServerContext,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

// ============================================================================
// Plugin Manager
// ============================================================================

/// Manages installed plugins and their lifecycles.
///
/// Installation runs in two phases (command registration, then init) so a
/// plugin never observes itself half-registered. Uninstall withdraws the
/// plugin's commands from the registry *before* shutting the plugin down and
/// releasing it, which is what keeps an in-flight dispatch from ever reaching
/// a torn-down plugin.
pub struct PluginManager {
    /// Server context shared with plugins
    context: Arc<ServerContextImpl>,
    /// Installed plugins, keyed by plugin name
    plugins: RwLock<HashMap<String, InstalledPlugin>>,
    /// Synchronously readable snapshot of what is installed
    roster: Arc<PluginRoster>,
}

/// An installed plugin with its owner handle and metadata.
struct InstalledPlugin {
    /// The plugin instance
    plugin: Box<dyn Plugin>,
    /// Owner handle its registrations were made under
    owner: CommandOwner,
    /// Plugin metadata
    metadata: PluginMetadata,
}

/// Plugin metadata
#[derive(Debug, Clone)]
struct PluginMetadata {
    version: String,
    installed_at: std::time::SystemTime,
    core: bool,
}

impl PluginManager {
    /// Creates a manager over the given registry and message catalog.
    pub fn new(commands: Arc<CommandRegistry>, messages: Arc<MessageCatalog>) -> Self {
        Self {
            context: Arc::new(ServerContextImpl::new(commands, messages)),
            plugins: RwLock::new(HashMap::new()),
            roster: Arc::new(PluginRoster::default()),
        }
    }

    /// Installs an ordinary plugin.
    pub async fn install(&self, plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        self.install_with(plugin, false).await
    }

    /// Installs the core framework plugin. Its commands can never be
    /// overridden by anyone else.
    pub async fn install_core(&self, plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        self.install_with(plugin, true).await
    }

    async fn install_with(
        &self,
        mut plugin: Box<dyn Plugin>,
        core: bool,
    ) -> Result<(), PluginError> {
        let name = plugin.name().to_string();
        let version = plugin.version().to_string();

        {
            let plugins = self.plugins.read().await;
            if plugins.contains_key(&name) {
                return Err(PluginError::AlreadyInstalled(name));
            }
        }

        let owner = if core {
            CommandOwner::core(&name)
        } else {
            CommandOwner::plugin(&name)
        };

        debug!("Installing plugin {} v{}", name, version);

        // Phase 1: command registration. A failure withdraws whatever the
        // plugin managed to register before it bailed.
        if let Err(e) = plugin.register_commands(&owner, self.context.clone()).await {
            error!("Plugin {} command registration failed: {}", name, e);
            self.context.commands().unregister_owned_by(&owner);
            return Err(e);
        }

        let command_count = self.context.commands().commands_owned_by(&owner).len();
        info!(
            "Plugin {} registered {} command(s)",
            name, command_count
        );

        // Phase 2: initialization. On failure the commands contributed in
        // phase 1 are withdrawn again so nothing dangles.
        if let Err(e) = plugin.on_init(self.context.clone()).await {
            error!("Plugin {} initialization failed: {}", name, e);
            self.context.commands().unregister_owned_by(&owner);
            return Err(e);
        }

        let metadata = PluginMetadata {
            version: version.clone(),
            installed_at: std::time::SystemTime::now(),
            core,
        };

        {
            let mut plugins = self.plugins.write().await;
            plugins.insert(
                name.clone(),
                InstalledPlugin {
                    plugin,
                    owner,
                    metadata,
                },
            );
        }

        self.roster.record(PluginInfo {
            name: name.clone(),
            version,
            core,
            command_count,
        });

        info!("Plugin {} installed successfully", name);
        Ok(())
    }

    /// Uninstalls a plugin by name.
    ///
    /// Its commands are withdrawn from the registry before `on_shutdown`
    /// runs and before the plugin is dropped. Commands whose names were
    /// since taken over by another plugin are left with their new owner.
    pub async fn uninstall(&self, plugin_name: &str) -> Result<(), PluginError> {
        let mut plugins = self.plugins.write().await;

        let Some(mut installed) = plugins.remove(plugin_name) else {
            return Err(PluginError::NotFound(plugin_name.to_string()));
        };

        info!("Uninstalling plugin {}", plugin_name);

        let withdrawn = self
            .context
            .commands()
            .unregister_owned_by(&installed.owner);
        debug!(
            "Withdrew {} command(s) while uninstalling {}",
            withdrawn, plugin_name
        );

        if let Err(e) = installed.plugin.on_shutdown(self.context.clone()).await {
            error!("Error shutting down plugin {}: {}", plugin_name, e);
        }

        self.roster.remove(plugin_name);
        info!("Plugin {} uninstalled", plugin_name);
        Ok(())
    }

    /// Shuts down every installed plugin, core last.
    pub async fn shutdown_all(&self) {
        let mut plugins = self.plugins.write().await;
        let mut names: Vec<String> = plugins.keys().cloned().collect();
        names.sort_by_key(|name| {
            plugins
                .get(name)
                .map(|p| p.metadata.core)
                .unwrap_or(false)
        });

        info!("Shutting down {} plugin(s)", names.len());

        for name in names {
            if let Some(mut installed) = plugins.remove(&name) {
                self.context
                    .commands()
                    .unregister_owned_by(&installed.owner);
                if let Err(e) = installed.plugin.on_shutdown(self.context.clone()).await {
                    error!("Error shutting down plugin {}: {}", name, e);
                }
                self.roster.remove(&name);
            }
        }

        info!("All plugins shut down");
    }

    /// Current plugin system statistics.
    pub async fn stats(&self) -> PluginSystemStats {
        let plugins = self.plugins.read().await;
        let commands = self.context.commands();

        PluginSystemStats {
            total_plugins: plugins.len(),
            total_commands: commands.command_count(),
            plugins: plugins
                .iter()
                .map(|(name, installed)| PluginStats {
                    name: name.clone(),
                    version: installed.metadata.version.clone(),
                    core: installed.metadata.core,
                    command_count: commands.commands_owned_by(&installed.owner).len(),
                    installed_at: installed.metadata.installed_at,
                })
                .collect(),
        }
    }

    /// Names of the installed plugins.
    pub async fn installed_plugins(&self) -> Vec<String> {
        let plugins = self.plugins.read().await;
        plugins.keys().cloned().collect()
    }

    /// The synchronously readable roster, safe to hand to command callbacks.
    pub fn roster(&self) -> Arc<PluginRoster> {
        self.roster.clone()
    }

    /// The server context shared with plugins.
    pub fn context(&self) -> Arc<ServerContextImpl> {
        self.context.clone()
    }
}

// ============================================================================
// Server Context Implementation
// ============================================================================

/// Server context backed by the framework's registry and catalog.
pub struct ServerContextImpl {
    commands: Arc<CommandRegistry>,
    messages: Arc<MessageCatalog>,
}

impl ServerContextImpl {
    pub fn new(commands: Arc<CommandRegistry>, messages: Arc<MessageCatalog>) -> Self {
        Self { commands, messages }
    }
}

impl ServerContext for ServerContextImpl {
    fn commands(&self) -> Arc<CommandRegistry> {
        self.commands.clone()
    }

    fn messages(&self) -> Arc<MessageCatalog> {
        self.messages.clone()
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => error!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Info => info!("{}", message),
            LogLevel::Debug => debug!("{}", message),
            LogLevel::Trace => tracing::trace!("{}", message),
        }
    }
}

// ============================================================================
// Roster and Statistics
// ============================================================================

/// Snapshot of an installed plugin, as shown by the `plugins` command.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub core: bool,
    pub command_count: usize,
}

/// Synchronously readable list of installed plugins.
///
/// Kept current by the manager; command callbacks read it without touching
/// the async plugin table.
#[derive(Debug, Default)]
pub struct PluginRoster {
    entries: parking_lot::RwLock<Vec<PluginInfo>>,
}

impl PluginRoster {
    fn record(&self, info: PluginInfo) {
        let mut entries = self.entries.write();
        entries.retain(|entry| entry.name != info.name);
        entries.push(info);
        entries.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn remove(&self, name: &str) {
        self.entries.write().retain(|entry| entry.name != name);
    }

    /// Current roster contents.
    pub fn snapshot(&self) -> Vec<PluginInfo> {
        self.entries.read().clone()
    }

    /// Number of installed plugins.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Plugin system statistics.
#[derive(Debug, Clone)]
pub struct PluginSystemStats {
    pub total_plugins: usize,
    pub total_commands: usize,
    pub plugins: Vec<PluginStats>,
}

#[derive(Debug, Clone)]
pub struct PluginStats {
    pub name: String,
    pub version: String,
    pub core: bool,
    pub command_count: usize,
    pub installed_at: std::time::SystemTime,
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Creates a plugin manager with a fresh registry (using the given restricted
/// name set) and a default message catalog.
pub fn create_plugin_manager(
    restricted: std::collections::HashSet<String>,
) -> Arc<PluginManager> {
    let commands = Arc::new(CommandRegistry::new(restricted));
    let messages = Arc::new(MessageCatalog::new());
    Arc::new(PluginManager::new(commands, messages))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use command_system::CommandCallback;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    // Mock plugin for testing
    struct TestPlugin {
        name: String,
        commands: Vec<String>,
        fail_init: bool,
        shut_down: Arc<AtomicBool>,
    }

    impl TestPlugin {
        fn new(name: &str, commands: &[&str]) -> Self {
            Self {
                name: name.to_string(),
                commands: commands.iter().map(|c| c.to_string()).collect(),
                fail_init: false,
                shut_down: Arc::new(AtomicBool::new(false)),
            }
        }

        fn failing_init(mut self) -> Self {
            self.fail_init = true;
            self
        }
    }

    fn noop_callback() -> CommandCallback {
        Arc::new(|_, _, _| true)
    }

    #[async_trait]
    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        fn version(&self) -> &str {
            "1.0.0"
        }

        async fn register_commands(
            &mut self,
            owner: &CommandOwner,
            context: Arc<dyn ServerContext>,
        ) -> Result<(), PluginError> {
            for command in &self.commands {
                context.commands().register(command, owner, noop_callback())?;
            }
            Ok(())
        }

        async fn on_init(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
            if self.fail_init {
                return Err(PluginError::InitializationFailed("test failure".into()));
            }
            context.log(LogLevel::Info, "Test plugin initialized");
            Ok(())
        }

        async fn on_shutdown(
            &mut self,
            _context: Arc<dyn ServerContext>,
        ) -> Result<(), PluginError> {
            self.shut_down.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager() -> Arc<PluginManager> {
        create_plugin_manager(HashSet::from(["".to_string()]))
    }

    #[tokio::test]
    async fn install_registers_commands_and_roster() {
        let manager = manager();
        manager
            .install(Box::new(TestPlugin::new("warp", &["tp", "home"])))
            .await
            .unwrap();

        let commands = manager.context().commands();
        assert!(commands.lookup("tp").is_some());
        assert!(commands.lookup("home").is_some());

        let roster = manager.roster().snapshot();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "warp");
        assert_eq!(roster[0].command_count, 2);
        assert!(!roster[0].core);
    }

    #[tokio::test]
    async fn duplicate_install_is_rejected() {
        let manager = manager();
        manager
            .install(Box::new(TestPlugin::new("warp", &["tp"])))
            .await
            .unwrap();

        let result = manager
            .install(Box::new(TestPlugin::new("warp", &["other"])))
            .await;
        assert!(matches!(result, Err(PluginError::AlreadyInstalled(_))));
        // The rejected instance registered nothing.
        assert!(manager.context().commands().lookup("other").is_none());
    }

    #[tokio::test]
    async fn failed_init_withdraws_registered_commands() {
        let manager = manager();
        let result = manager
            .install(Box::new(TestPlugin::new("broken", &["oops"]).failing_init()))
            .await;

        assert!(matches!(result, Err(PluginError::InitializationFailed(_))));
        assert!(manager.context().commands().lookup("oops").is_none());
        assert!(manager.roster().is_empty());
    }

    #[tokio::test]
    async fn uninstall_withdraws_commands_before_shutdown() {
        let manager = manager();
        let plugin = TestPlugin::new("warp", &["tp"]);
        let shut_down = plugin.shut_down.clone();
        manager.install(Box::new(plugin)).await.unwrap();

        manager.uninstall("warp").await.unwrap();

        assert!(manager.context().commands().lookup("tp").is_none());
        assert!(shut_down.load(Ordering::SeqCst));
        assert!(manager.roster().is_empty());
        assert!(matches!(
            manager.uninstall("warp").await,
            Err(PluginError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn uninstall_spares_names_taken_over_by_others() {
        let manager = manager();
        manager
            .install(Box::new(TestPlugin::new("warp_one", &["tp"])))
            .await
            .unwrap();
        manager
            .install(Box::new(TestPlugin::new("warp_two", &["tp"])))
            .await
            .unwrap();

        manager.uninstall("warp_one").await.unwrap();

        let survivor = manager.context().commands().lookup("tp").unwrap();
        assert_eq!(survivor.owner.name(), "warp_two");
    }

    #[tokio::test]
    async fn core_install_protects_commands() {
        let manager = manager();
        manager
            .install_core(Box::new(TestPlugin::new("core", &["version"])))
            .await
            .unwrap();

        let intruder = CommandOwner::plugin("intruder");
        let result = manager
            .context()
            .commands()
            .register("version", &intruder, noop_callback());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn registration_conflict_aborts_install() {
        let manager = manager();
        manager
            .install_core(Box::new(TestPlugin::new("core", &["version"])))
            .await
            .unwrap();

        // A plugin that insists on a protected name fails installation with
        // the registration error carried through, and the commands it did
        // manage to register are withdrawn again.
        let result = manager
            .install(Box::new(TestPlugin::new("usurper", &["mine", "version"])))
            .await;
        assert!(matches!(result, Err(PluginError::Registration(_))));
        assert!(manager.context().commands().lookup("mine").is_none());
        assert!(manager.roster().snapshot().iter().all(|p| p.name != "usurper"));
    }

    #[tokio::test]
    async fn stats_track_plugins_and_commands() {
        let manager = manager();
        manager
            .install(Box::new(TestPlugin::new("warp", &["tp", "home"])))
            .await
            .unwrap();
        manager
            .install_core(Box::new(TestPlugin::new("core", &["version"])))
            .await
            .unwrap();

        let stats = manager.stats().await;
        assert_eq!(stats.total_plugins, 2);
        assert_eq!(stats.total_commands, 3);

        let core_stats = stats.plugins.iter().find(|p| p.name == "core").unwrap();
        assert!(core_stats.core);
        assert_eq!(core_stats.command_count, 1);
    }

    #[tokio::test]
    async fn shutdown_all_empties_everything() {
        let manager = manager();
        manager
            .install(Box::new(TestPlugin::new("warp", &["tp"])))
            .await
            .unwrap();
        manager
            .install_core(Box::new(TestPlugin::new("core", &["version"])))
            .await
            .unwrap();

        manager.shutdown_all().await;

        assert_eq!(manager.context().commands().command_count(), 0);
        assert!(manager.roster().is_empty());
        assert!(manager.installed_plugins().await.is_empty());
    }
}
