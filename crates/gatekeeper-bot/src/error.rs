//! Error types for the bot binary.

/// Errors that can occur while starting or running the bot.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Reading chat input failed.
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),
}
