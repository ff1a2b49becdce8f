//! Ledger services: the transactional write path and the record read path.
//!
//! Each mutation follows the same shape: validate, open a transaction and
//! lock the account row (bounded by the lock timeout), re-check sufficiency
//! against the locked value, write the new total, append the record, commit.
//! Any error rolls everything back.

pub mod balance_ledger;
pub mod points_ledger;

pub use balance_ledger::BalanceLedgerService;
pub use points_ledger::PointsLedgerService;

use memberlink_core::ledger::LedgerError;
use sea_orm::DbErr;

fn record_write_failed(err: DbErr) -> LedgerError {
    LedgerError::RecordWriteFailed(err.to_string())
}

fn read_failed(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}
