//! spesa-core: data model, row validation, and aggregation for the Spesa
//! expense ledger.

pub mod aggregate;
pub mod error;
pub mod period;
pub mod row;
pub mod transaction;

pub use aggregate::{LedgerTotal, Summary, period_summary, total};
pub use error::ReplyError;
pub use period::{InvalidPeriod, PeriodKey};
pub use row::{HEADER, RowIssue, RowStatus, classify_row, parse_amount};
pub use transaction::{
    CATEGORIES, DATE_FORMAT, InvalidTransaction, Transaction, normalize_category,
    validate_transaction,
};
