//! Transaction record type and the closed category label set

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format used everywhere in the ledger (e.g. "15-03-2025")
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// The closed category set the extraction prompt constrains the model to.
/// The ledger itself is not schema-enforced: unrecognized labels are stored
/// verbatim.
pub const CATEGORIES: [&str; 10] = [
    "Food",
    "Transport",
    "Home",
    "Leisure",
    "Investments",
    "Health",
    "Shopping",
    "Services",
    "Gifts",
    "Other",
];

/// One expense, as extracted from a user message and stored as a ledger row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Date of the expense in `DD-MM-YYYY` form
    pub date: String,
    /// Category label, ideally from [`CATEGORIES`]
    pub category: String,
    /// Short human-readable label of what was bought
    pub description: String,
    /// Amount spent, non-negative
    pub amount: f64,
}

impl Transaction {
    /// Ledger row in fixed column order: date, category, description, amount.
    /// The amount is written with `.` as decimal separator.
    pub fn to_row(&self) -> [String; 4] {
        [
            self.date.clone(),
            self.category.clone(),
            self.description.clone(),
            format!("{:.2}", self.amount),
        ]
    }
}

/// Map a label onto the canonical category spelling when it matches one
/// case-insensitively; unknown labels pass through untouched.
pub fn normalize_category(label: &str) -> String {
    let trimmed = label.trim();
    for known in CATEGORIES {
        if known.eq_ignore_ascii_case(trimmed) {
            return known.to_string();
        }
    }
    trimmed.to_string()
}

/// Why a freshly extracted transaction was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransaction {
    #[error("date '{0}' is not a valid DD-MM-YYYY date")]
    BadDate(String),
    #[error("description is empty")]
    EmptyDescription,
    #[error("amount {0} is not a usable expense amount")]
    BadAmount(String),
}

/// Post-parse validation of a model-produced record. Field presence is
/// guaranteed by deserialization; this checks the values actually hold up
/// before anything is written to the ledger.
pub fn validate_transaction(txn: &Transaction) -> Result<(), InvalidTransaction> {
    if NaiveDate::parse_from_str(&txn.date, DATE_FORMAT).is_err() {
        return Err(InvalidTransaction::BadDate(txn.date.clone()));
    }
    if txn.description.trim().is_empty() {
        return Err(InvalidTransaction::EmptyDescription);
    }
    if !txn.amount.is_finite() || txn.amount < 0.0 {
        return Err(InvalidTransaction::BadAmount(txn.amount.to_string()));
    }
    Ok(())
}
