//! Migration to create the apps table.
//!
//! This migration creates the apps table which stores user-owned applications.
//! The current_subscription_id column deliberately carries no foreign key:
//! it is a last-writer-wins pointer maintained inside the activation
//! transaction, not an ownership relation.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Apps::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Apps::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Apps::Name).text().not_null())
                    .col(ColumnDef::new(Apps::Description).text().null())
                    .col(ColumnDef::new(Apps::Kind).text().not_null())
                    .col(ColumnDef::new(Apps::Framework).text().not_null())
                    .col(ColumnDef::new(Apps::DomainName).text().null())
                    .col(ColumnDef::new(Apps::Screenshot).text().null())
                    .col(ColumnDef::new(Apps::UserId).uuid().null())
                    .col(ColumnDef::new(Apps::CurrentSubscriptionId).uuid().null())
                    .col(
                        ColumnDef::new(Apps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Apps::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_apps_user_id")
                            .from(Apps::Table, Apps::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on user_id for owner-scoped listing queries
        manager
            .create_index(
                Index::create()
                    .name("idx_apps_user_id")
                    .table(Apps::Table)
                    .col(Apps::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_apps_user_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Apps::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Apps {
    Table,
    Id,
    Name,
    Description,
    Kind,
    Framework,
    DomainName,
    Screenshot,
    UserId,
    CurrentSubscriptionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
