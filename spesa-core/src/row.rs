//! Per-row classification for ledger rows read back as raw text.
//!
//! Ledger columns in fixed order: date, category, description, amount.
//! Amounts come back with either `.` or `,` as decimal separator and are
//! normalized before parsing. A row that does not hold up is classified as
//! malformed rather than aborting aggregation.

/// Column indices in the ledger
pub const COL_DATE: usize = 0;
pub const COL_CATEGORY: usize = 1;
pub const COL_DESCRIPTION: usize = 2;
pub const COL_AMOUNT: usize = 3;

/// Header row written when a ledger file is first created
pub const HEADER: [&str; 4] = ["Date", "Category", "Description", "Amount"];

/// Outcome of classifying one raw ledger row
#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    /// Row is usable for aggregation
    Aggregable {
        date: String,
        category: String,
        amount: f64,
    },
    /// Row is skipped, with the reason kept for observability
    Malformed(RowIssue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIssue {
    MissingDate,
    MissingCategory,
    MissingAmount,
    BadAmount,
}

/// Normalize an amount cell: the ledger holds text with either `.` or `,`
/// as the decimal separator.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Classify a raw row as aggregable or malformed. Category text is trimmed
/// (so "Food " merges with "Food") but case is preserved.
pub fn classify_row(row: &[String]) -> RowStatus {
    let date = match row.get(COL_DATE) {
        Some(d) if !d.trim().is_empty() => d.trim().to_string(),
        _ => return RowStatus::Malformed(RowIssue::MissingDate),
    };
    let category = match row.get(COL_CATEGORY) {
        Some(c) if !c.trim().is_empty() => c.trim().to_string(),
        _ => return RowStatus::Malformed(RowIssue::MissingCategory),
    };
    let amount_cell = match row.get(COL_AMOUNT) {
        Some(a) => a,
        None => return RowStatus::Malformed(RowIssue::MissingAmount),
    };
    let amount = match parse_amount(amount_cell) {
        Some(v) => v,
        None => return RowStatus::Malformed(RowIssue::BadAmount),
    };

    RowStatus::Aggregable {
        date,
        category,
        amount,
    }
}
