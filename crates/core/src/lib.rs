//! Core business logic for MemberLink.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! The asset ledger rules live here: which mutation types exist, how a signed
//! delta is applied to a running total, when granted points expire, and how
//! record listings are filtered. The transactional side lives in `memberlink-db`.
//!
//! # Modules
//!
//! - `ledger` - Balance and points mutation rules

pub mod ledger;
