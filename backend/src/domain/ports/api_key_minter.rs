//! Port for generating and checking API keys.

use crate::domain::IssuedApiKey;

/// Generates API keys and digests their secrets.
///
/// Only the digest is stored, so a leaked table does not reveal usable keys.
#[cfg_attr(test, mockall::automock)]
pub trait ApiKeyMinter: Send + Sync {
    /// Generate a new key id and secret, with the secret's digest.
    fn mint(&self) -> IssuedApiKey;

    /// Whether a presented secret matches the stored digest, compared in
    /// constant time.
    fn verify(&self, secret: &str, stored_digest: &str) -> bool;
}
