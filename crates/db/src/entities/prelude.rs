//! Entity re-exports.

pub use super::balance_records::Entity as BalanceRecords;
pub use super::member_accounts::Entity as MemberAccounts;
pub use super::points_records::Entity as PointsRecords;
