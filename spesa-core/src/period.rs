//! Period keys: canonical `MM-YYYY` identifiers for scoped aggregation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A calendar month/year in canonical `MM-YYYY` form, e.g. "03-2025".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodKey(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid MM-YYYY period key")]
pub struct InvalidPeriod(pub String);

impl PeriodKey {
    /// Validate and wrap an `MM-YYYY` string: month in 01..=12, 4-digit year.
    pub fn parse(s: &str) -> Result<Self, InvalidPeriod> {
        let s = s.trim();
        let invalid = || InvalidPeriod(s.to_string());

        let (month, year) = s.split_once('-').ok_or_else(invalid)?;
        if month.len() != 2 || year.len() != 4 {
            return Err(invalid());
        }
        let m: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&m) {
            return Err(invalid());
        }
        let _: u32 = year.parse().map_err(|_| invalid())?;

        Ok(Self(s.to_string()))
    }

    /// The period a date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{:02}-{:04}", date.month(), date.year()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
