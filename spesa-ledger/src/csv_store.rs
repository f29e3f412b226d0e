//! File-backed ledger stored as a CSV file.
//!
//! Reads return every record verbatim as text, header included. Appends
//! write one record at the end. Deletes rewrite the file without the given
//! 1-based row; the ledger is small enough that a full rewrite stays cheap
//! and keeps the file the single source of truth.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::store::{LedgerStore, StoreError};

pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    /// Open a ledger file, creating it with the canonical header when it
    /// does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut wtr = csv::Writer::from_path(&path)
                .map_err(|e| StoreError::Append(format!("{}: {e}", path.display())))?;
            wtr.write_record(spesa_core::HEADER)
                .map_err(|e| StoreError::Append(e.to_string()))?;
            wtr.flush()
                .map_err(|e| StoreError::Append(e.to_string()))?;
        }
        Ok(Self { path })
    }

    fn write_all(&self, rows: &[Vec<String>]) -> Result<(), StoreError> {
        let mut wtr = csv::Writer::from_path(&self.path)
            .map_err(|e| StoreError::Delete(format!("{}: {e}", self.path.display())))?;
        for row in rows {
            wtr.write_record(row)
                .map_err(|e| StoreError::Delete(e.to_string()))?;
        }
        wtr.flush().map_err(|e| StoreError::Delete(e.to_string()))
    }
}

impl LedgerStore for CsvLedger {
    fn read_all(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(&self.path)
            .map_err(|e| StoreError::Read(format!("{}: {e}", self.path.display())))?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| StoreError::Read(e.to_string()))?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }
        Ok(rows)
    }

    fn append_row(&mut self, row: &[String; 4]) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::Append(format!("{}: {e}", self.path.display())))?;
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.write_record(row)
            .map_err(|e| StoreError::Append(e.to_string()))?;
        wtr.flush().map_err(|e| StoreError::Append(e.to_string()))
    }

    fn delete_row(&mut self, index: usize) -> Result<(), StoreError> {
        let mut rows = self.read_all()?;
        if index == 0 || index > rows.len() {
            return Err(StoreError::OutOfRange(index));
        }
        rows.remove(index - 1);
        self.write_all(&rows)
    }
}
