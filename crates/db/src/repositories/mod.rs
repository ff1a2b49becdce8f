//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod ledger_record;

pub use account::AccountRepository;
pub use ledger_record::{LedgerRecordRepository, NewBalanceRecord, NewPointsRecord};
