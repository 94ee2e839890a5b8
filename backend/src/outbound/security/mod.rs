//! Credential adapters: password hashing, signed tokens, and API key digests.
//!
//! These implement the domain's [`PasswordHasher`](crate::domain::ports::PasswordHasher),
//! [`TokenService`](crate::domain::ports::TokenService), and
//! [`ApiKeyMinter`](crate::domain::ports::ApiKeyMinter) ports. Only this
//! module depends on `argon2` and `jsonwebtoken`.

mod api_key_minter;
mod argon2_password_hasher;
mod jwt_token_service;

pub use api_key_minter::Sha256ApiKeyMinter;
pub use argon2_password_hasher::Argon2PasswordHasher;
pub use jwt_token_service::{JwtSecrets, JwtTokenService, TokenLifetimes};
