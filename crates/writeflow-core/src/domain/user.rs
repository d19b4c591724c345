use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - an account that can author and react to posts.
///
/// `username` is the unique, email-shaped login handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(name: String, username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            username,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial profile change. Fields left as `None` are kept.
    pub fn apply_changes(
        &mut self,
        name: Option<String>,
        username: Option<String>,
        password_hash: Option<String>,
    ) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(username) = username {
            self.username = username;
        }
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_changes_keeps_unset_fields() {
        let mut user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "hash".to_string(),
        );
        let before = user.updated_at;

        user.apply_changes(Some("Ada L.".to_string()), None, None);

        assert_eq!(user.name, "Ada L.");
        assert_eq!(user.username, "ada@example.com");
        assert_eq!(user.password_hash, "hash");
        assert!(user.updated_at >= before);
    }
}
