//! Fixtures shared by handler tests.

use std::sync::Arc;

use actix_web::{
    App, Error,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::header,
};

use writeflow_core::domain::User;
use writeflow_core::ports::{BaseRepository, PasswordService, TokenService};
use writeflow_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use crate::config::DEFAULT_HIGHLIGHTS_LIMIT;
use crate::state::AppState;

pub const PASSWORD: &str = "secret1";

/// In-memory state with a fixed JWT secret and cheap Argon2 parameters.
pub fn test_state() -> AppState {
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "handler-test-secret".to_string(),
        ..Default::default()
    }));
    let passwords: Arc<dyn PasswordService> =
        Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap());

    AppState::in_memory(tokens, passwords, DEFAULT_HIGHLIGHTS_LIMIT)
}

pub fn test_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = Error,
        InitError = (),
    >,
> {
    App::new().configure(move |cfg| {
        state.register(cfg);
        super::configure_routes(cfg);
    })
}

/// Store a user whose password is [`PASSWORD`] and return it with a session token.
pub async fn seed_user(state: &AppState, name: &str, username: &str) -> (User, String) {
    let hash = state.passwords.hash(PASSWORD).unwrap();
    let user = state
        .users
        .save(User::new(name.to_string(), username.to_string(), hash))
        .await
        .unwrap();
    let token = state.tokens.issue(user.id, &user.username).unwrap();
    (user, token)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}
