//! spesa-extract: LLM-backed extraction of transaction records and period
//! keys from free text.

pub mod client;
pub mod extractor;
pub mod mock;
pub mod prompts;
pub mod resolver;

pub use client::{GeminiClient, InferenceClient, InferenceError};
pub use extractor::{ExtractError, TransactionExtractor};
pub use mock::MockInference;
pub use resolver::{PeriodResolver, ResolveError};
