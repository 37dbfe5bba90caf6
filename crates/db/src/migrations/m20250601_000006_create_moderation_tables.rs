//! Create `abuse_report` and `moderation_action` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create abuse_report table
        manager
            .create_table(
                Table::create()
                    .table(AbuseReport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AbuseReport::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AbuseReport::ReporterId).string_len(32).not_null())
                    .col(ColumnDef::new(AbuseReport::TargetUserId).string_len(32).not_null())
                    .col(ColumnDef::new(AbuseReport::GroupId).string_len(32))
                    .col(ColumnDef::new(AbuseReport::Comment).text().not_null())
                    .col(
                        ColumnDef::new(AbuseReport::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(AbuseReport::AssigneeId).string_len(32))
                    .col(ColumnDef::new(AbuseReport::ResolutionComment).text())
                    .col(
                        ColumnDef::new(AbuseReport::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AbuseReport::ResolvedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: status (pending report queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_abuse_report_status")
                    .table(AbuseReport::Table)
                    .col(AbuseReport::Status)
                    .to_owned(),
            )
            .await?;

        // Index: target_user_id (reports against a user)
        manager
            .create_index(
                Index::create()
                    .name("idx_abuse_report_target_user_id")
                    .table(AbuseReport::Table)
                    .col(AbuseReport::TargetUserId)
                    .to_owned(),
            )
            .await?;

        // Create moderation_action table
        manager
            .create_table(
                Table::create()
                    .table(ModerationAction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModerationAction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ModerationAction::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ModerationAction::ModeratorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ModerationAction::Action).string_len(20).not_null())
                    .col(ColumnDef::new(ModerationAction::Reason).text())
                    .col(ColumnDef::new(ModerationAction::SuspensionDays).integer())
                    .col(ColumnDef::new(ModerationAction::KarmaDelta).integer().not_null())
                    .col(
                        ColumnDef::new(ModerationAction::AutoBan)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ModerationAction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, created_at) - moderation history per user
        manager
            .create_index(
                Index::create()
                    .name("idx_moderation_action_user_created_at")
                    .table(ModerationAction::Table)
                    .col(ModerationAction::UserId)
                    .col(ModerationAction::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModerationAction::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AbuseReport::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AbuseReport {
    Table,
    Id,
    ReporterId,
    TargetUserId,
    GroupId,
    Comment,
    Status,
    AssigneeId,
    ResolutionComment,
    CreatedAt,
    ResolvedAt,
}

#[derive(Iden)]
enum ModerationAction {
    Table,
    Id,
    UserId,
    ModeratorId,
    Action,
    Reason,
    SuspensionDays,
    KarmaDelta,
    AutoBan,
    CreatedAt,
}
