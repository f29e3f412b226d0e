//! Transaction extraction: free text in, validated record or Unparseable
//! out.
//!
//! One inference call per message, no retry on malformed output: a failed
//! attempt is final for that message, which keeps latency and cost bounded.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use spesa_core::{InvalidTransaction, Transaction, normalize_category, validate_transaction};

use crate::client::{InferenceClient, InferenceError};
use crate::prompts::extraction_prompt;

/// Terminal failure: the message does not yield a valid record. The caller
/// must not fabricate a partial one.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("model reply was not the expected JSON object: {0}")]
    Malformed(String),
    #[error("extracted record failed validation: {0}")]
    Invalid(#[from] InvalidTransaction),
}

/// Wire shape of the model's reply. `amount` tolerates a numeric string,
/// since models occasionally quote numbers even when told not to.
#[derive(Deserialize)]
struct RawExtraction {
    date: String,
    category: String,
    description: String,
    amount: serde_json::Value,
}

fn amount_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

pub struct TransactionExtractor<'a, C: InferenceClient> {
    client: &'a C,
}

impl<'a, C: InferenceClient> TransactionExtractor<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Extract one transaction from a user message. Any transport failure,
    /// parse failure, or validation failure is terminal.
    pub async fn extract(
        &self,
        user_text: &str,
        reference_date: NaiveDate,
    ) -> Result<Transaction, ExtractError> {
        let prompt = extraction_prompt(user_text, reference_date);
        let reply = self.client.complete(&prompt).await?;

        let raw: RawExtraction = serde_json::from_str(&reply)
            .map_err(|e| ExtractError::Malformed(e.to_string()))?;

        let amount = amount_from_value(&raw.amount)
            .ok_or_else(|| ExtractError::Malformed(format!("amount: {}", raw.amount)))?;

        let txn = Transaction {
            date: raw.date.trim().to_string(),
            category: normalize_category(&raw.category),
            description: raw.description.trim().to_string(),
            amount,
        };
        validate_transaction(&txn)?;

        tracing::debug!(category = %txn.category, amount = txn.amount, "extracted transaction");
        Ok(txn)
    }
}
