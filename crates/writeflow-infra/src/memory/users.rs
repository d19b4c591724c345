use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use writeflow_core::domain::User;
use writeflow_core::error::RepoError;
use writeflow_core::ports::{BaseRepository, UserRepository};

use super::StoreData;

/// In-memory user repository.
pub struct InMemoryUserRepository {
    data: Arc<RwLock<StoreData>>,
}

impl InMemoryUserRepository {
    pub(super) fn new(data: Arc<RwLock<StoreData>>) -> Self {
        Self { data }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.data.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut data = self.data.write().await;

        let taken = data
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            return Err(RepoError::Conflict("username already exists".to_string()));
        }

        data.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut data = self.data.write().await;
        match data.remove_user_cascade(id) {
            Some(_) => {
                tracing::debug!(user_id = %id, "Removed user and authored posts");
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let data = self.data.read().await;
        Ok(data
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::super::InMemoryStore;
    use super::*;
    use writeflow_core::domain::{Post, ReactionKind};
    use writeflow_core::ports::PostRepository;

    fn user(username: &str) -> User {
        User::new("Test".to_string(), username.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_save_and_find_by_username() {
        let repo = InMemoryStore::new().users();
        let saved = repo.save(user("a@example.com")).await.unwrap();

        let found = repo.find_by_username("a@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(saved.id));
        assert!(repo.find_by_username("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = InMemoryStore::new().users();
        repo.save(user("a@example.com")).await.unwrap();

        let result = repo.save(user("a@example.com")).await;
        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_resave_same_user_is_update() {
        let repo = InMemoryStore::new().users();
        let mut saved = repo.save(user("a@example.com")).await.unwrap();

        saved.apply_changes(Some("Renamed".to_string()), None, None);
        repo.save(saved.clone()).await.unwrap();

        let found = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Renamed");
    }

    #[tokio::test]
    async fn test_delete_cascades_posts_and_reactions() {
        let store = InMemoryStore::new();
        let users = store.users();
        let posts = store.posts();

        let author = users.save(user("author@example.com")).await.unwrap();
        let reader = users.save(user("reader@example.com")).await.unwrap();

        let own = posts
            .save(Post::new(author.id, "Mine".into(), "...".into()))
            .await
            .unwrap();
        let other = posts
            .save(Post::new(reader.id, "Theirs".into(), "...".into()))
            .await
            .unwrap();
        posts
            .toggle_reaction(other.id, author.id, ReactionKind::Like)
            .await
            .unwrap();

        users.delete(author.id).await.unwrap();

        assert!(posts.find_by_id(own.id).await.unwrap().is_none());
        let detail = posts.find_detail(other.id, reader.id).await.unwrap().unwrap();
        assert_eq!(detail.like_count, 0);
        assert!(matches!(
            users.delete(author.id).await,
            Err(RepoError::NotFound)
        ));
    }
}
