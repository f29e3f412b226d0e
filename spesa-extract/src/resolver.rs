//! Period resolution: a fuzzy month phrase in, a canonical `MM-YYYY` key
//! or Unresolvable out.
//!
//! The model performs the month arithmetic against the reference date;
//! locally we only check that the returned key is well-formed.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use spesa_core::{InvalidPeriod, PeriodKey};

use crate::client::{InferenceClient, InferenceError};
use crate::prompts::resolution_prompt;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("model reply was not the expected JSON object: {0}")]
    Malformed(String),
    /// Explicit null target: the phrase carries no temporal meaning
    #[error("phrase has no temporal meaning")]
    NoTemporalMeaning,
    #[error(transparent)]
    BadKey(#[from] InvalidPeriod),
}

#[derive(Deserialize)]
struct RawResolution {
    target: Option<String>,
}

pub struct PeriodResolver<'a, C: InferenceClient> {
    client: &'a C,
}

impl<'a, C: InferenceClient> PeriodResolver<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Resolve a user-supplied period phrase. Only called when the user
    /// actually gave one; "no argument means current period" is the
    /// caller's rule, not this component's.
    pub async fn resolve(
        &self,
        user_text: &str,
        reference_date: NaiveDate,
    ) -> Result<PeriodKey, ResolveError> {
        let prompt = resolution_prompt(user_text, reference_date);
        let reply = self.client.complete(&prompt).await?;

        let raw: RawResolution =
            serde_json::from_str(&reply).map_err(|e| ResolveError::Malformed(e.to_string()))?;

        let target = raw.target.ok_or(ResolveError::NoTemporalMeaning)?;
        let key = PeriodKey::parse(&target)?;

        tracing::debug!(period = %key, "resolved period phrase");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockInference;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_happy_path() {
        let client = MockInference::replying(r#"{"target": "03-2025"}"#);
        let resolver = PeriodResolver::new(&client);
        let key = resolver.resolve("last month", reference()).await.unwrap();
        assert_eq!(key.as_str(), "03-2025");
    }

    #[tokio::test]
    async fn test_resolve_sends_phrase_and_anchor() {
        let client = MockInference::replying(r#"{"target": "03-2025"}"#);
        let resolver = PeriodResolver::new(&client);
        resolver.resolve("last month", reference()).await.unwrap();

        let prompts = client.prompts();
        assert!(prompts[0].contains("last month"));
        assert!(prompts[0].contains("10-04-2025"));
    }

    #[tokio::test]
    async fn test_resolve_null_target_is_unresolvable() {
        let client = MockInference::replying(r#"{"target": null}"#);
        let resolver = PeriodResolver::new(&client);
        assert!(matches!(
            resolver.resolve("bananas", reference()).await,
            Err(ResolveError::NoTemporalMeaning)
        ));
    }

    #[tokio::test]
    async fn test_resolve_rejects_malformed_key() {
        let client = MockInference::replying(r#"{"target": "March 2025"}"#);
        let resolver = PeriodResolver::new(&client);
        assert!(matches!(
            resolver.resolve("march", reference()).await,
            Err(ResolveError::BadKey(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_rejects_out_of_range_month() {
        let client = MockInference::replying(r#"{"target": "13-2025"}"#);
        let resolver = PeriodResolver::new(&client);
        assert!(resolver.resolve("next month", reference()).await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_non_json_reply_is_malformed() {
        let client = MockInference::replying("last month was March");
        let resolver = PeriodResolver::new(&client);
        assert!(matches!(
            resolver.resolve("last month", reference()).await,
            Err(ResolveError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_transport_failure() {
        let client = MockInference::failing();
        let resolver = PeriodResolver::new(&client);
        assert!(matches!(
            resolver.resolve("last month", reference()).await,
            Err(ResolveError::Inference(_))
        ));
    }
}
