//! Create rating table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rating::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rating::GroupId).string_len(32).not_null())
                    .col(ColumnDef::new(Rating::RaterId).string_len(32).not_null())
                    .col(ColumnDef::new(Rating::GroupScore).small_integer().not_null())
                    .col(ColumnDef::new(Rating::LeaderScore).small_integer().not_null())
                    .col(ColumnDef::new(Rating::Comment).text())
                    .col(
                        ColumnDef::new(Rating::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Rating::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: one rating per (group, rater)
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_group_rater")
                    .table(Rating::Table)
                    .col(Rating::GroupId)
                    .col(Rating::RaterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rating::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Rating {
    Table,
    Id,
    GroupId,
    RaterId,
    GroupScore,
    LeaderScore,
    Comment,
    CreatedAt,
    UpdatedAt,
}
