//! spesa-ledger: append-only row store behind the Spesa expense ledger.

pub mod csv_store;
pub mod store;

pub use csv_store::CsvLedger;
pub use store::{LedgerStore, MemoryLedger, StoreError, UndoError, undo_last};
