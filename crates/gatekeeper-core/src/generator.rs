//! Generator collaborator trait and stub implementation.
//!
//! The Markov-chain model that learns from chat and produces messages lives
//! outside this workspace. The [`Generator`] trait is the contract the bot
//! relies on: feed it messages, ask it for a continuation of a seed.
//! Both operations receive the bootstrapped store handle, so a real backend
//! can keep its state in `PostgreSQL`.
//!
//! [`StubGenerator`] keeps ingested messages in memory and answers with the
//! latest one that continues the seed. It lets the startup sequence run end
//! to end before a model backend is wired in.

use gatekeeper_db::PostgresPool;
use tokio::sync::Mutex;

/// Errors reported by a [`Generator`].
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Nothing the generator knows continues the seed.
    #[error("no continuation found for seed {seed:?}")]
    NoContinuation {
        /// The seed that could not be continued.
        seed: String,
    },

    /// The generator backend failed.
    #[error("generator backend error: {0}")]
    Backend(String),
}

/// A text generator trained from chat messages.
pub trait Generator {
    /// Feed one message into the generator's training state.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Backend`] if the message could not be
    /// recorded.
    fn ingest(
        &self,
        store: &PostgresPool,
        message: &str,
    ) -> impl Future<Output = Result<(), GeneratorError>> + Send;

    /// Produce a message starting with `seed`, at most `max_len` characters
    /// long.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] describing why no message was produced.
    fn generate(
        &self,
        store: &PostgresPool,
        seed: &str,
        max_len: usize,
    ) -> impl Future<Output = Result<String, GeneratorError>> + Send;
}

/// In-memory generator that replays ingested messages.
///
/// `generate` returns the most recently ingested message that starts with
/// the seed, cut to `max_len` characters. The store handle is not used.
#[derive(Debug, Default)]
pub struct StubGenerator {
    messages: Mutex<Vec<String>>,
}

impl StubGenerator {
    /// Create an empty stub generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages ingested so far.
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    /// Whether nothing has been ingested yet.
    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

impl Generator for StubGenerator {
    async fn ingest(&self, _store: &PostgresPool, message: &str) -> Result<(), GeneratorError> {
        self.messages.lock().await.push(message.to_owned());
        Ok(())
    }

    async fn generate(
        &self,
        _store: &PostgresPool,
        seed: &str,
        max_len: usize,
    ) -> Result<String, GeneratorError> {
        let messages = self.messages.lock().await;
        messages
            .iter()
            .rev()
            .find(|message| message.starts_with(seed))
            .map(|message| message.chars().take(max_len).collect())
            .ok_or_else(|| GeneratorError::NoContinuation {
                seed: seed.to_owned(),
            })
    }
}
