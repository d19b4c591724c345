//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use writeflow_core::domain::{
    AuthorRef, Post, PostDetail, PostSummary, ReactionKind, ReactionOutcome, User,
};
use writeflow_core::error::RepoError;
use writeflow_core::ports::{PostRepository, UserRepository};

use super::entity::post::Entity as PostEntity;
use super::entity::post_dislike::{self, Entity as PostDislikeEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Mask a login handle for logging to avoid PII in logs.
fn mask_username(username: &str) -> String {
    match username.split_once('@') {
        Some((local, domain)) => {
            let head: String = local.chars().take(1).collect();
            format!("{head}***@{domain}")
        }
        None => "***".to_string(),
    }
}

fn author_ref(author_id: Uuid, author: Option<user::Model>) -> AuthorRef {
    match author {
        Some(u) => AuthorRef {
            id: u.id,
            name: u.name,
        },
        None => AuthorRef {
            id: author_id,
            name: "Anonymous".to_string(),
        },
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %mask_username(username), "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

/// One row of a `GROUP BY post_id` count over a reaction table.
#[derive(Debug, FromQueryResult)]
struct ReactionCount {
    post_id: Uuid,
    count: i64,
}

fn count_map(rows: Vec<ReactionCount>) -> HashMap<Uuid, u64> {
    rows.into_iter()
        .map(|row| (row.post_id, row.count.max(0) as u64))
        .collect()
}

impl PostgresPostRepository {
    async fn like_counts(&self) -> Result<HashMap<Uuid, u64>, RepoError> {
        let rows = PostLikeEntity::find()
            .select_only()
            .column(post_like::Column::PostId)
            .column_as(Expr::col(post_like::Column::UserId).count(), "count")
            .group_by(post_like::Column::PostId)
            .into_model::<ReactionCount>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count_map(rows))
    }

    async fn dislike_counts(&self) -> Result<HashMap<Uuid, u64>, RepoError> {
        let rows = PostDislikeEntity::find()
            .select_only()
            .column(post_dislike::Column::PostId)
            .column_as(Expr::col(post_dislike::Column::UserId).count(), "count")
            .group_by(post_dislike::Column::PostId)
            .into_model::<ReactionCount>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count_map(rows))
    }
}

/// Delete the (post, user) row of the given reaction. Returns whether one existed.
async fn remove_reaction<C: ConnectionTrait>(
    conn: &C,
    kind: ReactionKind,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<bool, RepoError> {
    let result = match kind {
        ReactionKind::Like => {
            PostLikeEntity::delete_many()
                .filter(post_like::Column::PostId.eq(post_id))
                .filter(post_like::Column::UserId.eq(user_id))
                .exec(conn)
                .await
        }
        ReactionKind::Dislike => {
            PostDislikeEntity::delete_many()
                .filter(post_dislike::Column::PostId.eq(post_id))
                .filter(post_dislike::Column::UserId.eq(user_id))
                .exec(conn)
                .await
        }
    }
    .map_err(map_db_err)?;

    Ok(result.rows_affected > 0)
}

async fn insert_reaction<C: ConnectionTrait>(
    conn: &C,
    kind: ReactionKind,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<(), RepoError> {
    let now = Utc::now().into();
    match kind {
        ReactionKind::Like => {
            PostLikeEntity::insert(post_like::ActiveModel {
                post_id: Set(post_id),
                user_id: Set(user_id),
                created_at: Set(now),
            })
            .exec_without_returning(conn)
            .await
        }
        ReactionKind::Dislike => {
            PostDislikeEntity::insert(post_dislike::ActiveModel {
                post_id: Set(post_id),
                user_id: Set(user_id),
                created_at: Set(now),
            })
            .exec_without_returning(conn)
            .await
        }
    }
    .map_err(map_db_err)?;

    Ok(())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_summaries(&self) -> Result<Vec<PostSummary>, RepoError> {
        let rows = PostEntity::find()
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        let likes = self.like_counts().await?;
        let dislikes = self.dislike_counts().await?;

        tracing::debug!(posts = rows.len(), "Loaded post summaries");

        Ok(rows
            .into_iter()
            .map(|(post, author)| PostSummary {
                id: post.id,
                author: author_ref(post.author_id, author),
                like_count: likes.get(&post.id).copied().unwrap_or(0),
                dislike_count: dislikes.get(&post.id).copied().unwrap_or(0),
                title: post.title,
                content: post.content,
                created_at: post.created_at.into(),
                published_at: post.published_at.map(Into::into),
            })
            .collect())
    }

    async fn find_detail(
        &self,
        post_id: Uuid,
        viewer: Uuid,
    ) -> Result<Option<PostDetail>, RepoError> {
        let Some((post, author)) = PostEntity::find_by_id(post_id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let like_count = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        let dislike_count = PostDislikeEntity::find()
            .filter(post_dislike::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        let liked_by_viewer = PostLikeEntity::find_by_id((post_id, viewer))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();
        let disliked_by_viewer = PostDislikeEntity::find_by_id((post_id, viewer))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();

        Ok(Some(PostDetail {
            author: author_ref(post.author_id, author),
            post: post.into(),
            like_count,
            dislike_count,
            liked_by_viewer,
            disliked_by_viewer,
        }))
    }

    async fn toggle_reaction(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        kind: ReactionKind,
    ) -> Result<ReactionOutcome, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        // Row lock on the post serializes concurrent toggles for it.
        let exists = PostEntity::find_by_id(post_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .is_some();
        if !exists {
            return Err(RepoError::NotFound);
        }

        remove_reaction(&txn, kind.opposite(), post_id, user_id).await?;
        let active = if remove_reaction(&txn, kind, post_id, user_id).await? {
            false
        } else {
            insert_reaction(&txn, kind, post_id, user_id).await?;
            true
        };

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(%post_id, %user_id, ?kind, active, "Toggled reaction");
        Ok(ReactionOutcome { kind, active })
    }
}

#[cfg(test)]
mod tests {
    use super::mask_username;

    #[test]
    fn test_mask_username() {
        assert_eq!(mask_username("alice@example.com"), "a***@example.com");
        assert_eq!(mask_username("@example.com"), "***@example.com");
        assert_eq!(mask_username("plain"), "***");
    }
}
