//! Data Transfer Objects - request/response types for the API.
//!
//! Blog payloads use camelCase field names to match the existing web client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format. Use (e.g., youremail@gmail.com)"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Request to sign in.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(email)]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Partial account update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email)]
    pub username: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
}

/// Issued session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Public profile fields of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Blogs
// ---------------------------------------------------------------------------

/// Body for creating or editing a blog post.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BlogInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
}

/// Feed card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSummary {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub published_date: Option<DateTime<Utc>>,
    pub author: AuthorSummary,
    pub like_count: u64,
    pub dislike_count: u64,
}

/// Full blog post record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub published_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDetailResponse {
    pub blog: BlogView,
    pub is_liked: bool,
    pub is_disliked: bool,
    pub like_count: u64,
    pub dislike_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogUpdatedResponse {
    pub message: String,
    pub blog: BlogView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogDeletedResponse {
    pub message: String,
    pub post: BlogView,
}

/// Result of a like/dislike toggle, with the caller's reaction afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionResponse {
    pub message: String,
    pub liked: bool,
    pub disliked: bool,
}

/// `GET /blog/highlights?limit=N`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HighlightsQuery {
    pub limit: Option<usize>,
}
