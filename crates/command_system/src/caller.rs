//! Caller abstraction over "who issued this command".
//!
//! The registry and dispatcher never care whether input came from an in-world
//! participant or the operator console; both are reached through the same
//! capability set. Engine-facing session types live with the engine
//! adaptation layer; only the console shape is universal enough to live
//! here.

use tracing::info;

/// Identity string of the operator console.
pub const CONSOLE_ID: &str = "server_console";

/// Capability set shared by everything that can issue commands.
///
/// `id` and `name` feed diagnostics and language preferences only; dispatch
/// decisions never depend on them. `reply` must not block; implementations
/// backed by a network connection are expected to queue.
pub trait CommandCaller: Send + Sync {
    /// Stable identity of the caller.
    fn id(&self) -> &str;

    /// Display name used in log and diagnostic text.
    fn name(&self) -> &str;

    /// Sends a reply line back to the caller.
    fn reply(&self, message: &str);
}

/// The operator console. It carries no in-world identity; replies land in
/// the server log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleCaller;

impl CommandCaller for ConsoleCaller {
    fn id(&self) -> &str {
        CONSOLE_ID
    }

    fn name(&self) -> &str {
        "Server Console"
    }

    fn reply(&self, message: &str) {
        info!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_caller_identity() {
        let console = ConsoleCaller;
        assert_eq!(console.id(), CONSOLE_ID);
        assert_eq!(console.name(), "Server Console");
    }
}
