//! Chat command intake.
//!
//! Reads chat lines until end of input and classifies each one with
//! [`parse_command`]. Acting on a command is the dispatcher's job; this loop
//! only logs what it saw.

use gatekeeper_chat::parse_command;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, trace};

use crate::error::BotError;

/// Read lines from `reader` until EOF and log every command.
///
/// Returns the number of lines that parsed as commands.
pub async fn run_console<R: AsyncBufRead + Unpin>(reader: R) -> Result<usize, BotError> {
    let mut lines = reader.lines();
    let mut commands: usize = 0;

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Some(command) => {
                commands = commands.saturating_add(1);
                info!(
                    prefix = %command.prefix(),
                    name = command.name(),
                    args = command.args(),
                    "Command received"
                );
            }
            None => trace!(len = line.len(), "Ignoring non-command line"),
        }
    }

    Ok(commands)
}
