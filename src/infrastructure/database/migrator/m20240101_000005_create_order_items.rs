//! Migration to create order_items table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItems::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderItems::OrderId).string_len(36).not_null())
                    .col(ColumnDef::new(OrderItems::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(OrderItems::Title).string_len(255).not_null())
                    .col(ColumnDef::new(OrderItems::Description).text().not_null())
                    .col(ColumnDef::new(OrderItems::Image).string().null())
                    .col(ColumnDef::new(OrderItems::LargeImage).string().null())
                    .col(ColumnDef::new(OrderItems::Price).big_integer().not_null())
                    .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_items_order")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderItems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum OrderItems {
    Table,
    Id,
    OrderId,
    UserId,
    Title,
    Description,
    Image,
    LargeImage,
    Price,
    Quantity,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
}
