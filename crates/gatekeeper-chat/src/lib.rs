//! Chat text handling for the Gatekeeper bot.
//!
//! Two pure, allocation-light transforms live here:
//!
//! - [`command`] -- classifies an incoming chat line as a bot command
//!   (`$name args` / `!name args`) or rejects it.
//! - [`mask`] -- redacts Discord user mentions from outbound text so the
//!   bot never pings people with generated output.
//!
//! Both are hand-written linear scanners with no shared mutable state, so
//! they are safe to call from any number of tasks at once.

pub mod command;
pub mod mask;

pub use command::{COMMAND_PREFIXES, Command, parse_command};
pub use mask::{DISCORD_PING_REDACTION, contains_discord_ping, mask_discord_pings};
