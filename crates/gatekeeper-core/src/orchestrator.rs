//! Startup warm-up sequence.
//!
//! Once the store is bootstrapped, the bot primes the generator with a few
//! sample messages and asks it for one message. The message is masked before
//! it is handed back, so nothing the generator produces can ping a user.

use gatekeeper_chat::mask_discord_pings;
use gatekeeper_db::PostgresPool;
use tracing::{debug, error, warn};

use crate::generator::{Generator, GeneratorError};

/// Default seed for the warm-up message.
const DEFAULT_SEED: &str = "HEL";

/// Default maximum length of the warm-up message, in characters.
const DEFAULT_MAX_LEN: usize = 256;

/// Default sample messages fed to the generator.
const DEFAULT_SAMPLES: [&str; 5] = ["HELLO", "HELP", "HELL", "HELLO KITTY", "HELLO WORLD"];

/// What to feed the generator and what to ask of it during warm-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmUpPlan {
    /// Messages ingested before generating, in order.
    pub samples: Vec<String>,
    /// Seed prefix for the generated message.
    pub seed: String,
    /// Maximum length of the generated message, in characters.
    pub max_len: usize,
}

impl Default for WarmUpPlan {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES.iter().map(|&s| s.to_owned()).collect(),
            seed: DEFAULT_SEED.to_owned(),
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

/// Feed `plan.samples` to the generator, then generate one masked message.
///
/// A sample that fails to ingest is logged and skipped. If generation fails
/// the error is returned as is: nothing is masked or emitted.
///
/// # Errors
///
/// Returns the [`GeneratorError`] from [`Generator::generate`].
pub async fn warm_up<G: Generator>(
    generator: &G,
    store: &PostgresPool,
    plan: &WarmUpPlan,
) -> Result<String, GeneratorError> {
    for sample in &plan.samples {
        if let Err(e) = generator.ingest(store, sample).await {
            warn!(error = %e, sample = %sample, "Failed to feed sample message");
        }
    }
    debug!(samples = plan.samples.len(), "Sample messages fed to the generator");

    let message = generator
        .generate(store, &plan.seed, plan.max_len)
        .await
        .inspect_err(|e| error!(error = %e, seed = %plan.seed, "Message generation failed"))?;

    Ok(mask_discord_pings(&message))
}
