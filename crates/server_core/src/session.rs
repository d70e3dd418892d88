//! In-world caller sessions.

use command_system::CommandCaller;
use tokio::sync::mpsc;
use tracing::warn;

/// An in-world participant as seen by the command layer.
///
/// The identity and display name come from the engine's connection data.
/// Replies are queued on a bounded channel; the engine adaptation layer
/// drains the receiver and delivers the text however the engine wants it
/// delivered. Queueing keeps `reply` non-blocking, which callbacks rely on.
pub struct PlayerSession {
    id: String,
    name: String,
    outbound: mpsc::Sender<String>,
}

impl PlayerSession {
    /// Creates a session and the receiving half of its reply queue.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<String>) {
        let (outbound, receiver) = mpsc::channel(capacity);
        (
            Self {
                id: id.into(),
                name: name.into(),
                outbound,
            },
            receiver,
        )
    }

    /// Creates a session over an existing reply sender, for engines that
    /// multiplex replies onto a shared channel.
    pub fn with_sender(
        id: impl Into<String>,
        name: impl Into<String>,
        outbound: mpsc::Sender<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            outbound,
        }
    }
}

impl CommandCaller for PlayerSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reply(&self, message: &str) {
        if let Err(e) = self.outbound.try_send(message.to_string()) {
            warn!("Dropping reply to {} ({}): {}", self.name, self.id, e);
        }
    }
}
