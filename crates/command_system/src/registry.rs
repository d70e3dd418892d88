//! Command registry with owner tracking and an override policy.
//!
//! The registry owns the mapping from normalized command name to its current
//! owner and callback. Normalized-name equality (trimmed, lowercased) is the
//! sole identity used for lookup and conflict detection. At most one live
//! registration exists per name at any instant: later plugins may shadow
//! earlier ones (hot-reload friendliness, with a warning so collisions never
//! go unnoticed), but core-owned commands and restricted names are
//! tamper-proof.

use crate::caller::CommandCaller;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Callback invoked when a registered command is dispatched.
///
/// Receives the caller, the normalized command name, and the argument tokens.
/// The return value is the callback's own verdict on whether the input was
/// handled; a `false` falls through to the unknown-command reply.
pub type CommandCallback = Arc<dyn Fn(&dyn CommandCaller, &str, &[String]) -> bool + Send + Sync>;

/// Opaque handle identifying the plugin that contributed a registration.
///
/// The core flag drives the override policy; the display name appears only in
/// diagnostic messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOwner {
    name: String,
    is_core: bool,
}

impl CommandOwner {
    /// Owner handle for an ordinary plugin.
    pub fn plugin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_core: false,
        }
    }

    /// Owner handle for the core framework plugin. Commands registered under
    /// a core owner can never be replaced by anyone else.
    pub fn core(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_core: true,
        }
    }

    /// Display name of the owning plugin.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this owner is the core framework.
    pub fn is_core(&self) -> bool {
        self.is_core
    }
}

impl fmt::Display for CommandOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A live command registration.
#[derive(Clone)]
pub struct RegisteredCommand {
    /// Normalized command name, the registry key.
    pub name: String,
    /// The plugin that contributed this registration.
    pub owner: CommandOwner,
    /// The callback to invoke on dispatch.
    pub callback: CommandCallback,
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("callback", &"[callback]")
            .finish()
    }
}

/// Errors produced when a registration is rejected by the override policy.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// The name is owned by the core framework and cannot be replaced.
    #[error("Command '{0}' is protected by the core plugin and cannot be overridden")]
    ProtectedByCore(String),
    /// The name is a member of the restricted set and can never be registered.
    #[error("Command name '{0}' is restricted and cannot be registered")]
    Restricted(String),
}

/// Registry mapping normalized command names to their current registration.
///
/// An explicitly owned instance: created at framework start, shared via
/// `Arc`, torn down at framework stop. A single reader/writer lock guards the
/// map; [`CommandRegistry::dispatch`] holds the read half across lookup and
/// callback invocation so an uninstalling plugin can never have a callback
/// run after its commands were withdrawn.
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, RegisteredCommand>>,
    /// Names (and bare forms) that can never be registered, by anyone.
    restricted: HashSet<String>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands.read().len())
            .field("restricted", &self.restricted)
            .finish()
    }
}

impl CommandRegistry {
    /// Creates a registry with the given restricted name set.
    ///
    /// Restricted entries are normalized the same way command names are, so
    /// the policy check below compares like with like.
    pub fn new(restricted: HashSet<String>) -> Self {
        Self {
            commands: RwLock::new(HashMap::new()),
            restricted: restricted.into_iter().map(|n| normalize(&n)).collect(),
        }
    }

    /// Registers `name` under `owner`, subject to the override policy.
    ///
    /// On success the new registration replaces any previous one; replacing
    /// a different owner's command logs a warning naming both owners. On
    /// rejection the previous registration (if any) remains intact.
    pub fn register(
        &self,
        name: &str,
        owner: &CommandOwner,
        callback: CommandCallback,
    ) -> Result<(), RegistrationError> {
        let key = normalize(name);
        let mut commands = self.commands.write();

        // Override policy, in order: core protection first, then the
        // restricted set against both the full and the bare name.
        if let Some(existing) = commands.get(&key) {
            if existing.owner.is_core() {
                return Err(RegistrationError::ProtectedByCore(key));
            }
        }
        if self.restricted.contains(&key) || self.restricted.contains(bare_name(&key)) {
            return Err(RegistrationError::Restricted(key));
        }

        if let Some(previous) = commands.get(&key) {
            if previous.owner != *owner {
                warn!(
                    "{} has replaced the '{}' command previously registered by {}",
                    owner,
                    key,
                    previous.owner
                );
            }
        }

        commands.insert(
            key.clone(),
            RegisteredCommand {
                name: key,
                owner: owner.clone(),
                callback,
            },
        );
        Ok(())
    }

    /// Removes the registration for `name`, if one exists. Idempotent.
    ///
    /// Removal is keyed by name alone; the owner appears in the diagnostic
    /// only. Use [`CommandRegistry::unregister_owned_by`] when withdrawing a
    /// whole plugin, which does match on ownership.
    pub fn unregister(&self, name: &str, owner: &CommandOwner) {
        let key = normalize(name);
        if self.commands.write().remove(&key).is_some() {
            debug!("{} unregistered the '{}' command", owner, key);
        }
    }

    /// Removes every registration currently owned by `owner` and returns how
    /// many were withdrawn.
    ///
    /// Called by the plugin manager during uninstall, before the plugin's
    /// resources are released. Names that were since taken over by another
    /// owner are left alone.
    pub fn unregister_owned_by(&self, owner: &CommandOwner) -> usize {
        let mut commands = self.commands.write();
        let before = commands.len();
        commands.retain(|_, command| command.owner != *owner);
        let removed = before - commands.len();
        if removed > 0 {
            debug!("Withdrew {} command(s) owned by {}", removed, owner);
        }
        removed
    }

    /// Looks up the registration for `name`. Exact match on the normalized
    /// name; no fuzzy or partial matching.
    pub fn lookup(&self, name: &str) -> Option<RegisteredCommand> {
        self.commands.read().get(&normalize(name)).cloned()
    }

    /// Looks up `name` and invokes its callback in a single critical section.
    ///
    /// Returns `None` when no registration exists and `Some(handled)` with
    /// the callback's verdict otherwise. The read lock is held across the
    /// invocation, so callbacks must not register or unregister commands;
    /// mutation belongs to plugin lifecycle, never to dispatch.
    pub fn dispatch(&self, caller: &dyn CommandCaller, name: &str, args: &[String]) -> Option<bool> {
        let key = normalize(name);
        let commands = self.commands.read();
        let command = commands.get(&key)?;
        Some((command.callback)(caller, &command.name, args))
    }

    /// Number of live registrations.
    pub fn command_count(&self) -> usize {
        self.commands.read().len()
    }

    /// Names currently owned by `owner`, sorted for stable output.
    pub fn commands_owned_by(&self, owner: &CommandOwner) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .read()
            .values()
            .filter(|command| command.owner == *owner)
            .map(|command| command.name.clone())
            .collect();
        names.sort();
        names
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Portion of a normalized name after its first namespace separator, or the
/// whole name when it has none. `palisade.version` -> `version`,
/// `a.b.c` -> `b.c`.
fn bare_name(name: &str) -> &str {
    match name.split_once('.') {
        Some((_, rest)) => rest,
        None => name,
    }
}
