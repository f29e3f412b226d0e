//! The failure kinds the chat layer is allowed to see.
//!
//! Every external-call failure is caught at its call site and mapped onto
//! one of these before a reply is rendered. Raw transport or parsing
//! detail never reaches the end user.

use crate::period::PeriodKey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplyError {
    /// The extractor could not produce a valid transaction record
    #[error("unparseable expense message")]
    Unparseable,
    /// The resolver could not produce a valid period key
    #[error("unresolvable period phrase")]
    Unresolvable,
    /// A ledger read/append/delete did not happen
    #[error("ledger store unavailable")]
    StoreUnavailable,
    /// Aggregation found zero matching rows for the period
    #[error("no expenses found for {0}")]
    EmptyResult(PeriodKey),
}

impl ReplyError {
    /// Fixed user-facing message for each kind.
    pub fn user_message(&self) -> String {
        match self {
            ReplyError::Unparseable => {
                "I did not understand that expense. Try something like 'Pizza 15 euro'.".to_string()
            }
            ReplyError::Unresolvable => {
                "I did not understand the month. Try 'last month' or '03-2025'.".to_string()
            }
            ReplyError::StoreUnavailable => {
                "The ledger is unavailable right now. Nothing was changed; please retry.".to_string()
            }
            ReplyError::EmptyResult(period) => {
                format!("No expenses found for {period}.")
            }
        }
    }
}
