//! The ledger store contract and the in-memory reference implementation.
//!
//! The ledger is one logical table with four text columns in fixed order
//! (date, category, description, amount). Row 0 is the header. Rows have
//! no identifier of their own; a row's identity is its position.

use thiserror::Error;

/// A store operation did not happen. The caller treats all of these the
/// same way; the source text is kept for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("ledger read failed: {0}")]
    Read(String),
    #[error("ledger append failed: {0}")]
    Append(String),
    #[error("ledger delete failed: {0}")]
    Delete(String),
    #[error("row index {0} is out of range")]
    OutOfRange(usize),
}

/// Append-only read/write/delete-row access to the ledger.
pub trait LedgerStore {
    /// All rows, verbatim as text, header included.
    fn read_all(&self) -> Result<Vec<Vec<String>>, StoreError>;

    /// Append exactly one row at the end.
    fn append_row(&mut self, row: &[String; 4]) -> Result<(), StoreError>;

    /// Delete the row at a 1-based position.
    fn delete_row(&mut self, index: usize) -> Result<(), StoreError>;
}

/// Why an undo did not remove anything
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UndoError {
    /// Ledger holds only the header (or nothing at all)
    #[error("nothing to undo")]
    NothingToUndo,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Remove exactly the last row of the ledger, returning it. A ledger with
/// only the header (or an unreadable one) is reported as a failure, not
/// silently ignored.
pub fn undo_last<S: LedgerStore>(store: &mut S) -> Result<Vec<String>, UndoError> {
    let rows = store.read_all()?;
    if rows.len() <= 1 {
        return Err(UndoError::NothingToUndo);
    }
    let last = rows[rows.len() - 1].clone();
    store.delete_row(rows.len())?;
    Ok(last)
}

/// In-process ledger used by tests; also the reference semantics for the
/// trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    rows: Vec<Vec<String>>,
}

impl MemoryLedger {
    /// Empty ledger containing just the header row.
    pub fn with_header() -> Self {
        Self {
            rows: vec![spesa_core::HEADER.iter().map(|s| s.to_string()).collect()],
        }
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LedgerStore for MemoryLedger {
    fn read_all(&self) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self.rows.clone())
    }

    fn append_row(&mut self, row: &[String; 4]) -> Result<(), StoreError> {
        self.rows.push(row.to_vec());
        Ok(())
    }

    fn delete_row(&mut self, index: usize) -> Result<(), StoreError> {
        if index == 0 || index > self.rows.len() {
            return Err(StoreError::OutOfRange(index));
        }
        self.rows.remove(index - 1);
        Ok(())
    }
}
