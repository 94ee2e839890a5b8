//! Port for password hashing.
//!
//! Hashing is deliberately slow, so implementations run it off the async
//! executor.

use async_trait::async_trait;

use crate::domain::Password;

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHashError {
        /// The hash could not be computed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// One-way password hashing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` into a self-describing string.
    async fn hash(&self, password: &Password) -> Result<String, PasswordHashError>;

    /// Check `password` against a hash produced by [`PasswordHasher::hash`].
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;

    /// A well-formed hash that no password matches. Logins for unknown
    /// usernames verify against it so they take as long as wrong passwords.
    fn decoy_hash(&self) -> &'static str;
}
