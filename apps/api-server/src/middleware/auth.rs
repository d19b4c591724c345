//! Authentication extractor.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use uuid::Uuid;

use writeflow_core::ports::{AuthError, SessionClaims, TokenService};
use writeflow_shared::ErrorResponse;

/// Authenticated caller, decoded from the session token.
///
/// ```ignore
/// async fn profile(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Why a request carries no usable identity.
#[derive(Debug)]
pub enum AuthenticationError {
    /// The caller's token is missing or bad.
    Rejected(AuthError),
    /// No `TokenService` registered with the app.
    Misconfigured,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthenticationError::Rejected(err) => write!(f, "{}", err),
            AuthenticationError::Misconfigured => write!(f, "token service not configured"),
        }
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AuthenticationError::Rejected(AuthError::Hashing(_))
            | AuthenticationError::Misconfigured => {
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthenticationError::Rejected(_) => actix_web::http::StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let AuthenticationError::Rejected(err) = self else {
            return actix_web::HttpResponse::build(self.status_code())
                .json(ErrorResponse::internal_error());
        };

        let error = match err {
            AuthError::Expired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your session has expired. Please sign in again."),
            AuthError::Malformed(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingToken => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a token in the Authorization header."),
            AuthError::BadCredentials => ErrorResponse::unauthorized(),
            AuthError::Hashing(_) => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

/// Token from an `Authorization` header value.
///
/// The web client sends the raw token; `Bearer <token>` is accepted too.
fn token_from_header(value: &str) -> Option<&str> {
    let value = value.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthenticationError> {
    let Some(tokens) = req.app_data::<web::Data<Arc<dyn TokenService>>>() else {
        tracing::error!("TokenService not found in app data");
        return Err(AuthenticationError::Misconfigured);
    };

    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthenticationError::Rejected(AuthError::MissingToken))?;

    let token = value
        .to_str()
        .ok()
        .and_then(token_from_header)
        .ok_or(AuthenticationError::Rejected(AuthError::MissingToken))?;

    tokens
        .verify(token)
        .map(Identity::from)
        .map_err(AuthenticationError::Rejected)
}
