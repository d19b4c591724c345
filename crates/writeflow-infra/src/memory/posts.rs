use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use writeflow_core::domain::{
    AuthorRef, Post, PostDetail, PostSummary, ReactionKind, ReactionOutcome,
};
use writeflow_core::error::RepoError;
use writeflow_core::ports::{BaseRepository, PostRepository};

use super::StoreData;

/// In-memory post repository.
pub struct InMemoryPostRepository {
    data: Arc<RwLock<StoreData>>,
}

impl InMemoryPostRepository {
    pub(super) fn new(data: Arc<RwLock<StoreData>>) -> Self {
        Self { data }
    }
}

fn author_of(data: &StoreData, author_id: Uuid) -> AuthorRef {
    data.users
        .get(&author_id)
        .map(AuthorRef::from)
        .unwrap_or_else(|| AuthorRef {
            id: author_id,
            name: "Anonymous".to_string(),
        })
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.data.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut data = self.data.write().await;

        if !data.users.contains_key(&post.author_id) {
            return Err(RepoError::Conflict("author does not exist".to_string()));
        }

        data.reactions.entry(post.id).or_default();
        data.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut data = self.data.write().await;
        data.reactions.remove(&id);
        data.posts.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_summaries(&self) -> Result<Vec<PostSummary>, RepoError> {
        let data = self.data.read().await;
        let summaries = data
            .posts
            .values()
            .map(|post| {
                let (likes, dislikes) = data
                    .reactions
                    .get(&post.id)
                    .map(|r| (r.like_count(), r.dislike_count()))
                    .unwrap_or((0, 0));
                PostSummary {
                    id: post.id,
                    title: post.title.clone(),
                    content: post.content.clone(),
                    author: author_of(&data, post.author_id),
                    created_at: post.created_at,
                    published_at: post.published_at,
                    like_count: likes,
                    dislike_count: dislikes,
                }
            })
            .collect();
        Ok(summaries)
    }

    async fn find_detail(
        &self,
        post_id: Uuid,
        viewer: Uuid,
    ) -> Result<Option<PostDetail>, RepoError> {
        let data = self.data.read().await;
        let Some(post) = data.posts.get(&post_id) else {
            return Ok(None);
        };
        let reactions = data.reactions.get(&post_id).cloned().unwrap_or_default();

        Ok(Some(PostDetail {
            post: post.clone(),
            author: author_of(&data, post.author_id),
            like_count: reactions.like_count(),
            dislike_count: reactions.dislike_count(),
            liked_by_viewer: reactions.has_liked(viewer),
            disliked_by_viewer: reactions.has_disliked(viewer),
        }))
    }

    async fn toggle_reaction(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        kind: ReactionKind,
    ) -> Result<ReactionOutcome, RepoError> {
        let mut data = self.data.write().await;
        if !data.posts.contains_key(&post_id) {
            return Err(RepoError::NotFound);
        }
        // same outcome as the reaction tables' user foreign key
        if !data.users.contains_key(&user_id) {
            return Err(RepoError::Conflict("reacting user does not exist".to_string()));
        }
        Ok(data.reactions.entry(post_id).or_default().toggle(user_id, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::super::InMemoryStore;
    use super::*;
    use writeflow_core::domain::User;

    async fn seed_reader(store: &InMemoryStore, username: &str) -> Uuid {
        store
            .users()
            .save(User::new("Reader".into(), username.into(), "hash".into()))
            .await
            .unwrap()
            .id
    }

    async fn seeded() -> (InMemoryStore, User, Post) {
        let store = InMemoryStore::new();
        let author = store
            .users()
            .save(User::new(
                "Author".into(),
                "author@example.com".into(),
                "hash".into(),
            ))
            .await
            .unwrap();
        let post = store
            .posts()
            .save(Post::new(author.id, "Hello".into(), "World".into()))
            .await
            .unwrap();
        (store, author, post)
    }

    #[tokio::test]
    async fn test_save_requires_existing_author() {
        let repo = InMemoryStore::new().posts();
        let result = repo
            .save(Post::new(Uuid::new_v4(), "t".into(), "c".into()))
            .await;
        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_toggle_reaction_is_mutually_exclusive() {
        let (store, _author, post) = seeded().await;
        let posts = store.posts();
        let reader = seed_reader(&store, "reader@example.com").await;

        let liked = posts
            .toggle_reaction(post.id, reader, ReactionKind::Like)
            .await
            .unwrap();
        assert!(liked.liked());

        let disliked = posts
            .toggle_reaction(post.id, reader, ReactionKind::Dislike)
            .await
            .unwrap();
        assert!(disliked.disliked());

        let detail = posts.find_detail(post.id, reader).await.unwrap().unwrap();
        assert_eq!((detail.like_count, detail.dislike_count), (0, 1));
        assert!(!detail.liked_by_viewer);
        assert!(detail.disliked_by_viewer);
    }

    #[tokio::test]
    async fn test_concurrent_toggles_never_leave_both_reactions() {
        let (store, _author, post) = seeded().await;
        let reader = seed_reader(&store, "reader@example.com").await;

        let mut handles = Vec::new();
        for i in 0..50 {
            let posts = store.posts();
            let kind = if i % 2 == 0 {
                ReactionKind::Like
            } else {
                ReactionKind::Dislike
            };
            handles.push(tokio::spawn(async move {
                posts.toggle_reaction(post.id, reader, kind).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let detail = store
            .posts()
            .find_detail(post.id, reader)
            .await
            .unwrap()
            .unwrap();
        assert!(!(detail.liked_by_viewer && detail.disliked_by_viewer));
        assert!(detail.like_count + detail.dislike_count <= 1);
    }

    #[tokio::test]
    async fn test_toggle_on_missing_post() {
        let repo = InMemoryStore::new().posts();
        let result = repo
            .toggle_reaction(Uuid::new_v4(), Uuid::new_v4(), ReactionKind::Like)
            .await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_toggle_by_unknown_user_is_rejected() {
        let (store, _author, post) = seeded().await;
        let posts = store.posts();

        let result = posts
            .toggle_reaction(post.id, Uuid::new_v4(), ReactionKind::Like)
            .await;
        assert!(matches!(result, Err(RepoError::Conflict(_))));

        let summaries = posts.list_summaries().await.unwrap();
        assert_eq!(summaries[0].like_count, 0);
    }

    #[tokio::test]
    async fn test_list_summaries_counts_reactions() {
        let (store, author, post) = seeded().await;
        let posts = store.posts();
        for username in ["a@example.com", "b@example.com"] {
            let reader = seed_reader(&store, username).await;
            posts
                .toggle_reaction(post.id, reader, ReactionKind::Like)
                .await
                .unwrap();
        }

        let summaries = posts.list_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].like_count, 2);
        assert_eq!(summaries[0].author.name, author.name);
    }

    #[tokio::test]
    async fn test_delete_post() {
        let (store, _author, post) = seeded().await;
        let posts = store.posts();

        posts.delete(post.id).await.unwrap();
        assert!(posts.find_by_id(post.id).await.unwrap().is_none());
        assert!(matches!(posts.delete(post.id).await, Err(RepoError::NotFound)));
    }
}
