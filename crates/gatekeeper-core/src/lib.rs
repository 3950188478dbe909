//! Generator contract and startup orchestration for the Gatekeeper bot.
//!
//! # Modules
//!
//! - [`generator`] -- [`Generator`] trait and [`StubGenerator`].
//! - [`orchestrator`] -- warm-up sequence run after the store is
//!   bootstrapped: feed samples, generate one message, mask it.
//!
//! [`Generator`]: generator::Generator
//! [`StubGenerator`]: generator::StubGenerator

pub mod generator;
pub mod orchestrator;

pub use generator::{Generator, GeneratorError, StubGenerator};
pub use orchestrator::{WarmUpPlan, warm_up};
