//! Session tokens (JWT) and password hashing (Argon2).

mod jwt;
mod password;

pub use jwt::{JwtConfig, JwtTokenService};
pub use password::Argon2PasswordService;
