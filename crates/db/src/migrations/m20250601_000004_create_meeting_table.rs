//! Create meeting table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Meeting::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Meeting::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Meeting::GroupId).string_len(32).not_null())
                    .col(ColumnDef::new(Meeting::OrganizerId).string_len(32).not_null())
                    .col(ColumnDef::new(Meeting::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Meeting::Agenda).text())
                    .col(ColumnDef::new(Meeting::Location).string_len(512))
                    .col(
                        ColumnDef::new(Meeting::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Meeting::DurationMinutes).integer().not_null())
                    .col(
                        ColumnDef::new(Meeting::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (group_id, starts_at) - upcoming sessions query
        manager
            .create_index(
                Index::create()
                    .name("idx_meeting_group_starts_at")
                    .table(Meeting::Table)
                    .col(Meeting::GroupId)
                    .col(Meeting::StartsAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Meeting::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Meeting {
    Table,
    Id,
    GroupId,
    OrganizerId,
    Title,
    Agenda,
    Location,
    StartsAt,
    DurationMinutes,
    CreatedAt,
}
