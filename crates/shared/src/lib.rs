//! Shared types, errors, and configuration for MemberLink.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs that keep tenant scoping explicit
//! - Cent-denominated money helpers (no floats)
//! - Pagination types for record listings
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, LedgerConfig};
pub use error::{AppError, AppResult};
pub use types::{Cents, PageRequest, PageResponse, TenantId, UserId};
