//! Operator console loop.
//!
//! Reads lines from stdin and feeds them to the dispatcher on the console
//! channel. Replies (including the unknown-command notice) come back through
//! the console caller's logging sink.

use command_system::{CommandDispatcher, ConsoleCaller};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Runs until stdin closes.
pub async fn run_console(dispatcher: Arc<CommandDispatcher>) {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let console = ConsoleCaller;

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        if !dispatcher.handle_console(&console, &line) {
            debug!("Console line tokenized to nothing: {:?}", line);
        }
    }

    info!("Console input closed");
}
