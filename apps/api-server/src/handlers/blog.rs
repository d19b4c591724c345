//! Blog post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use writeflow_core::domain::{AuthorRef, Post, PostSummary, ReactionKind};
use writeflow_core::error::RepoError;
use writeflow_core::ports::{BaseRepository, PostRepository};
use writeflow_core::ranking;
use writeflow_shared::dto::{
    AuthorSummary, BlogDetailResponse, BlogDeletedResponse, BlogInput, BlogSummary,
    BlogUpdatedResponse, BlogView, CreatedResponse, HighlightsQuery, ReactionResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Upper bound for `?limit=` on the highlights strip.
pub const MAX_HIGHLIGHTS: usize = 50;

fn blog_not_found() -> AppError {
    AppError::NotFound("Blog not found".to_string())
}

fn author_summary(author: AuthorRef) -> AuthorSummary {
    AuthorSummary {
        id: author.id,
        name: author.name,
    }
}

fn summary_view(summary: PostSummary) -> BlogSummary {
    BlogSummary {
        id: summary.id,
        title: summary.title,
        content: summary.content,
        created_at: summary.created_at,
        published_date: summary.published_at,
        author: author_summary(summary.author),
        like_count: summary.like_count,
        dislike_count: summary.dislike_count,
    }
}

fn blog_view(post: Post, author: Option<AuthorRef>) -> BlogView {
    BlogView {
        id: post.id,
        title: post.title,
        content: post.content,
        author_id: post.author_id,
        created_at: post.created_at,
        published_date: post.published_at,
        updated_at: post.updated_at,
        author: author.map(author_summary),
    }
}

/// Load a post the caller is allowed to change.
async fn owned_post(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    action: &str,
) -> AppResult<Post> {
    let post = state.posts.find_by_id(id).await?.ok_or_else(blog_not_found)?;

    post.ensure_author(identity.user_id).map_err(|_| {
        tracing::warn!(
            post_id = %id,
            user_id = %identity.user_id,
            action,
            "Non-author tried to modify post"
        );
        AppError::Forbidden(format!("You do not have permissions to {action} this blog"))
    })?;

    Ok(post)
}

/// GET /api/v1/blog/bulk
///
/// Every post, ranked by engagement.
pub async fn bulk(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let summaries = state.posts.list_summaries().await?;
    let feed: Vec<BlogSummary> = ranking::into_ranked(summaries)
        .into_iter()
        .map(summary_view)
        .collect();

    Ok(HttpResponse::Ok().json(feed))
}

/// GET /api/v1/blog/highlights?limit=N
pub async fn highlights(
    state: web::Data<AppState>,
    query: web::Query<HighlightsQuery>,
) -> AppResult<HttpResponse> {
    let limit = query
        .limit
        .unwrap_or(state.highlights_limit)
        .min(MAX_HIGHLIGHTS);

    let summaries = state.posts.list_summaries().await?;
    let strip: Vec<BlogSummary> = ranking::top(&summaries, limit)
        .into_iter()
        .map(summary_view)
        .collect();

    Ok(HttpResponse::Ok().json(strip))
}

/// POST /api/v1/blog/create
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<BlogInput>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner();
    input.validate()?;
    Post::check_title(&input.title)?;

    let post = Post::new(identity.user_id, input.title, input.content);
    let post = state.posts.save(post).await.map_err(|e| match e {
        // token outlived its account
        RepoError::Conflict(_) => AppError::NotFound("User not found".to_string()),
        other => other.into(),
    })?;

    tracing::info!(post_id = %post.id, author_id = %post.author_id, "Post created");

    Ok(HttpResponse::Created().json(CreatedResponse { id: post.id }))
}

/// GET /api/v1/blog/{id}
pub async fn get(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state
        .posts
        .find_detail(path.into_inner(), identity.user_id)
        .await?
        .ok_or_else(blog_not_found)?;

    Ok(HttpResponse::Ok().json(BlogDetailResponse {
        blog: blog_view(detail.post, Some(detail.author)),
        is_liked: detail.liked_by_viewer,
        is_disliked: detail.disliked_by_viewer,
        like_count: detail.like_count,
        dislike_count: detail.dislike_count,
    }))
}

/// PUT /api/v1/blog/update/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<BlogInput>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner();
    input.validate()?;

    let mut post = owned_post(&state, &identity, path.into_inner(), "update").await?;
    post.edit(input.title, input.content)?;
    let post = state.posts.save(post).await?;

    Ok(HttpResponse::Ok().json(BlogUpdatedResponse {
        message: "Blog updated successfully!".to_string(),
        blog: blog_view(post, None),
    }))
}

/// DELETE /api/v1/blog/delete/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = owned_post(&state, &identity, id, "delete").await?;

    state.posts.delete(id).await.map_err(|e| match e {
        RepoError::NotFound => blog_not_found(),
        other => other.into(),
    })?;

    tracing::info!(post_id = %id, "Post deleted");

    Ok(HttpResponse::Ok().json(BlogDeletedResponse {
        message: format!("Post with ID {} deleted successfully", id),
        post: blog_view(post, None),
    }))
}

async fn react(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    kind: ReactionKind,
) -> AppResult<HttpResponse> {
    let outcome = state
        .posts
        .toggle_reaction(id, identity.user_id, kind)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => blog_not_found(),
            // account deleted while its token is still valid
            RepoError::Conflict(_) => AppError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;

    let message = match (kind, outcome.active) {
        (ReactionKind::Like, true) => "Blog liked",
        (ReactionKind::Like, false) => "Like removed",
        (ReactionKind::Dislike, true) => "Blog disliked",
        (ReactionKind::Dislike, false) => "Dislike removed",
    };

    Ok(HttpResponse::Ok().json(ReactionResponse {
        message: message.to_string(),
        liked: outcome.liked(),
        disliked: outcome.disliked(),
    }))
}

/// PUT /api/v1/blog/like/{id}
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    react(&state, &identity, path.into_inner(), ReactionKind::Like).await
}

/// PUT /api/v1/blog/dislike/{id}
pub async fn dislike(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    react(&state, &identity, path.into_inner(), ReactionKind::Dislike).await
}
