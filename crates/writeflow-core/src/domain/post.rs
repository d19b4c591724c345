use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Post entity - a blog entry owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. Posts are published as soon as they are written.
    pub fn new(author_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            content,
            created_at: now,
            published_at: Some(now),
            updated_at: now,
        }
    }

    /// Publication time if set, otherwise creation time.
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    /// Titles must contain something other than whitespace.
    pub fn check_title(title: &str) -> Result<(), DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::BlankTitle);
        }
        Ok(())
    }

    /// Only the author may modify or delete a post.
    pub fn ensure_author(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.author_id != user_id {
            return Err(DomainError::NotAuthor {
                post_id: self.id,
                user_id,
            });
        }
        Ok(())
    }

    /// Replace title and body. Publication time is left untouched.
    pub fn edit(&mut self, title: String, content: String) -> Result<(), DomainError> {
        Self::check_title(&title)?;
        self.title = title;
        self.content = content;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_is_published() {
        let post = Post::new(Uuid::new_v4(), "Title".into(), "Body".into());
        assert_eq!(post.published_at, Some(post.created_at));
        assert_eq!(post.effective_timestamp(), post.created_at);
    }

    #[test]
    fn test_ensure_author() {
        let author = Uuid::new_v4();
        let post = Post::new(author, "Title".into(), "Body".into());

        assert!(post.ensure_author(author).is_ok());
        assert!(matches!(
            post.ensure_author(Uuid::new_v4()),
            Err(DomainError::NotAuthor { .. })
        ));
    }

    #[test]
    fn test_effective_timestamp_falls_back_to_created_at() {
        let mut post = Post::new(Uuid::new_v4(), "Title".into(), "Body".into());
        post.published_at = None;
        assert_eq!(post.effective_timestamp(), post.created_at);
    }

    #[test]
    fn test_edit_rejects_blank_title() {
        let mut post = Post::new(Uuid::new_v4(), "Title".into(), "Body".into());
        let published = post.published_at;

        assert_eq!(
            post.edit("   ".into(), "New body".into()),
            Err(DomainError::BlankTitle)
        );
        assert_eq!(post.content, "Body");

        post.edit("New title".into(), "New body".into()).unwrap();
        assert_eq!(post.title, "New title");
        assert_eq!(post.published_at, published);
    }
}
