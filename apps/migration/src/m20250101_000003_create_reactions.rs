//! Like and dislike join tables. Both cascade on post and user deletion.

use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_users::Users;
use crate::m20250101_000002_create_posts::Posts;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn reaction_table<T: Iden + Copy + 'static>(
    table: T,
    post_id: T,
    user_id: T,
    created_at: T,
    prefix: &str,
) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(post_id).uuid().not_null())
        .col(ColumnDef::new(user_id).uuid().not_null())
        .col(
            ColumnDef::new(created_at)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .primary_key(Index::create().col(post_id).col(user_id))
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{prefix}_post"))
                .from(table, post_id)
                .to(Posts::Table, Posts::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{prefix}_user"))
                .from(table, user_id)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(reaction_table(
                PostLikes::Table,
                PostLikes::PostId,
                PostLikes::UserId,
                PostLikes::CreatedAt,
                "post_likes",
            ))
            .await?;

        manager
            .create_table(reaction_table(
                PostDislikes::Table,
                PostDislikes::PostId,
                PostDislikes::UserId,
                PostDislikes::CreatedAt,
                "post_dislikes",
            ))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostDislikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostLikes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum PostLikes {
    Table,
    PostId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PostDislikes {
    Table,
    PostId,
    UserId,
    CreatedAt,
}
