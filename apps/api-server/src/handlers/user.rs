//! Account handlers.

use actix_web::{HttpResponse, web};
use validator::Validate;

use writeflow_core::domain::User;
use writeflow_core::error::RepoError;
use writeflow_core::ports::{BaseRepository, UserRepository};
use writeflow_shared::dto::{
    AuthResponse, MessageResponse, ProfileResponse, SettingsResponse, SigninRequest,
    SignupRequest, UpdateSettingsRequest, UserProfile,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let jwt = state.tokens.issue(user.id, &user.username)?;

    Ok(AuthResponse {
        jwt,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.ttl_seconds().max(0) as u64,
    })
}

fn profile_of(user: &User) -> UserProfile {
    UserProfile {
        name: user.name.clone(),
        username: user.username.clone(),
    }
}

async fn load_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// POST /api/v1/user/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = state
        .users
        .save(User::new(req.name, req.username, password_hash))
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent signup
            RepoError::Conflict(_) => AppError::Conflict("Username already exists".to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(HttpResponse::Created().json(issue_token(&state, &user)?))
}

/// POST /api/v1/user/signin
pub async fn signin(
    state: web::Data<AppState>,
    body: web::Json<SigninRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or_else(invalid)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Rejected sign-in with wrong password");
        return Err(invalid());
    }

    Ok(HttpResponse::Ok().json(issue_token(&state, &user)?))
}

/// POST /api/v1/user/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout(identity: Identity) -> HttpResponse {
    tracing::debug!(user_id = %identity.user_id, username = %identity.username, "User logged out");
    HttpResponse::Ok().json(MessageResponse::new("Logged out successfully"))
}

/// GET /api/v1/user/profile
pub async fn profile(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = load_user(&state, &identity).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: profile_of(&user),
    }))
}

/// PUT /api/v1/user/setting
pub async fn update_settings(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateSettingsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let mut user = load_user(&state, &identity).await?;

    if let Some(username) = req.username.as_deref() {
        if let Some(owner) = state.users.find_by_username(username).await? {
            if owner.id != user.id {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
        }
    }

    let password_hash = req
        .password
        .as_deref()
        .map(|password| state.passwords.hash(password))
        .transpose()?;

    user.apply_changes(req.name, req.username, password_hash);
    let user = state.users.save(user).await?;

    Ok(HttpResponse::Ok().json(SettingsResponse {
        message: "Settings updated successfully".to_string(),
        user: profile_of(&user),
    }))
}

/// DELETE /api/v1/user/delete
///
/// Removes the caller together with their posts and reactions.
pub async fn delete_account(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    state.users.delete(identity.user_id).await.map_err(|e| match e {
        RepoError::NotFound => AppError::NotFound("User not found".to_string()),
        other => other.into(),
    })?;

    tracing::info!(user_id = %identity.user_id, "User deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}
