//! `SeaORM` entity definitions for the asset ledger tables.

pub mod prelude;

pub mod balance_records;
pub mod member_accounts;
pub mod points_records;
pub mod sea_orm_active_enums;
