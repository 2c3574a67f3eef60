//! Create order table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Order::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Order::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Order::ListingId).string_len(32).not_null())
                    .col(ColumnDef::new(Order::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Order::UseDate).date().not_null())
                    .col(ColumnDef::new(Order::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(Order::PaymentConfirmed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Order::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_listing")
                            .from(Order::Table, Order::ListingId)
                            .to(Listing::Table, Listing::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_user")
                            .from(Order::Table, Order::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for "my orders")
        manager
            .create_index(
                Index::create()
                    .name("idx_order_user_id")
                    .table(Order::Table)
                    .col(Order::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: (listing_id, payment_confirmed) for owner dumps and
        // review-eligibility checks
        manager
            .create_index(
                Index::create()
                    .name("idx_order_listing_confirmed")
                    .table(Order::Table)
                    .col(Order::ListingId)
                    .col(Order::PaymentConfirmed)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Order::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Order {
    Table,
    Id,
    ListingId,
    UserId,
    UseDate,
    Quantity,
    PaymentConfirmed,
    CreatedAt,
}

#[derive(Iden)]
enum Listing {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
