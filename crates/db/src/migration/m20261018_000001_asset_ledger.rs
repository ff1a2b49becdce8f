//! Asset ledger migration.
//!
//! Creates the account aggregate table and the two append-only record
//! tables. The schema is built with the portable `SeaQuery` builder so the
//! same migration runs on Postgres and on the SQLite test databases.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // ACCOUNT AGGREGATE
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(MemberAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MemberAccounts::TenantId)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberAccounts::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberAccounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(MemberAccounts::Balance).gte(0)),
                    )
                    .col(
                        ColumnDef::new(MemberAccounts::Points)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(MemberAccounts::Points).gte(0)),
                    )
                    .col(
                        ColumnDef::new(MemberAccounts::Status)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(MemberAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(MemberAccounts::TenantId)
                            .col(MemberAccounts::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // BALANCE RECORDS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(BalanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalanceRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BalanceRecords::TenantId)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceRecords::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceRecords::Amount)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(BalanceRecords::Amount).ne(0)),
                    )
                    .col(ColumnDef::new(BalanceRecords::Type).string_len(20).not_null())
                    .col(
                        ColumnDef::new(BalanceRecords::Remark)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(BalanceRecords::BalanceAfter)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(BalanceRecords::BalanceAfter).gte(0)),
                    )
                    .col(ColumnDef::new(BalanceRecords::OrderNo).string_len(64).null())
                    .col(
                        ColumnDef::new(BalanceRecords::Status)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(BalanceRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_balance_records_account")
                            .from(
                                BalanceRecords::Table,
                                (BalanceRecords::TenantId, BalanceRecords::UserId),
                            )
                            .to(
                                MemberAccounts::Table,
                                (MemberAccounts::TenantId, MemberAccounts::UserId),
                            )
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_balance_records_account_created")
                    .table(BalanceRecords::Table)
                    .col(BalanceRecords::TenantId)
                    .col(BalanceRecords::UserId)
                    .col(BalanceRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_balance_records_order_no")
                    .table(BalanceRecords::Table)
                    .col(BalanceRecords::TenantId)
                    .col(BalanceRecords::OrderNo)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // POINTS RECORDS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(PointsRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointsRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointsRecords::TenantId)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsRecords::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsRecords::Quantity)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(PointsRecords::Quantity).ne(0)),
                    )
                    .col(ColumnDef::new(PointsRecords::Type).string_len(20).not_null())
                    .col(
                        ColumnDef::new(PointsRecords::Remark)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PointsRecords::PointsAfter)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(PointsRecords::PointsAfter).gte(0)),
                    )
                    .col(ColumnDef::new(PointsRecords::OrderNo).string_len(64).null())
                    .col(
                        ColumnDef::new(PointsRecords::ExpireTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PointsRecords::Status)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(PointsRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(
                        Expr::col(PointsRecords::ExpireTime).is_null().or(
                            Expr::col(PointsRecords::ExpireTime)
                                .gt(Expr::col(PointsRecords::CreatedAt)),
                        ),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_points_records_account")
                            .from(
                                PointsRecords::Table,
                                (PointsRecords::TenantId, PointsRecords::UserId),
                            )
                            .to(
                                MemberAccounts::Table,
                                (MemberAccounts::TenantId, MemberAccounts::UserId),
                            )
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_points_records_account_created")
                    .table(PointsRecords::Table)
                    .col(PointsRecords::TenantId)
                    .col(PointsRecords::UserId)
                    .col(PointsRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_points_records_order_no")
                    .table(PointsRecords::Table)
                    .col(PointsRecords::TenantId)
                    .col(PointsRecords::OrderNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_points_records_expire")
                    .table(PointsRecords::Table)
                    .col(PointsRecords::TenantId)
                    .col(PointsRecords::UserId)
                    .col(PointsRecords::ExpireTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointsRecords::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BalanceRecords::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MemberAccounts::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum MemberAccounts {
    Table,
    TenantId,
    UserId,
    Balance,
    Points,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BalanceRecords {
    Table,
    Id,
    TenantId,
    UserId,
    Amount,
    Type,
    Remark,
    BalanceAfter,
    OrderNo,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PointsRecords {
    Table,
    Id,
    TenantId,
    UserId,
    Quantity,
    Type,
    Remark,
    PointsAfter,
    OrderNo,
    ExpireTime,
    Status,
    CreatedAt,
}
