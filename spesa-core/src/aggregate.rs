//! Aggregation over the raw ledger row sequence.
//!
//! Every total is recomputed from the full row sequence; no derived totals
//! are persisted anywhere. Row 0 is the header and is always skipped, even
//! when its content happens to look like data.

use crate::period::PeriodKey;
use crate::row::{RowStatus, classify_row};

/// Running total over the whole ledger
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerTotal {
    pub total: f64,
    /// Rows that contributed to the total
    pub counted: usize,
    /// Rows skipped as malformed (header not included)
    pub skipped: usize,
}

/// Period-scoped totals and category breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub period: PeriodKey,
    pub total: f64,
    /// Category totals, descending by amount; ties keep the order the
    /// category was first seen in the ledger.
    pub by_category: Vec<(String, f64)>,
    /// Rows that matched the period and contributed. Zero means "no data",
    /// which is not the same as a genuine total of 0.00.
    pub matched: usize,
    /// Rows skipped as malformed (period-independent)
    pub skipped: usize,
}

/// Sum every aggregable row in the ledger.
pub fn total(rows: &[Vec<String>]) -> LedgerTotal {
    let mut out = LedgerTotal {
        total: 0.0,
        counted: 0,
        skipped: 0,
    };

    for row in rows.iter().skip(1) {
        match classify_row(row) {
            RowStatus::Aggregable { amount, .. } => {
                out.total += amount;
                out.counted += 1;
            }
            RowStatus::Malformed(_) => out.skipped += 1,
        }
    }

    out
}

/// Total and category breakdown for one period.
///
/// A row belongs to the period when its date text contains the `MM-YYYY`
/// key as a substring. With dates in fixed DD-MM-YYYY form this is
/// equivalent to a month/year match; it is deliberately not a parsed-date
/// range comparison.
pub fn period_summary(rows: &[Vec<String>], period: &PeriodKey) -> Summary {
    let mut by_category: Vec<(String, f64)> = Vec::new();
    let mut summary = Summary {
        period: period.clone(),
        total: 0.0,
        by_category: Vec::new(),
        matched: 0,
        skipped: 0,
    };

    for row in rows.iter().skip(1) {
        let (date, category, amount) = match classify_row(row) {
            RowStatus::Aggregable {
                date,
                category,
                amount,
            } => (date, category, amount),
            RowStatus::Malformed(_) => {
                summary.skipped += 1;
                continue;
            }
        };

        if !date.contains(period.as_str()) {
            continue;
        }

        summary.total += amount;
        summary.matched += 1;

        match by_category.iter_mut().find(|(name, _)| *name == category) {
            Some((_, sum)) => *sum += amount,
            None => by_category.push((category, amount)),
        }
    }

    // Stable sort: equal totals keep first-encountered order.
    by_category.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    summary.by_category = by_category;
    summary
}
