//! Random API keys with SHA-256 secret digests.

use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::domain::IssuedApiKey;
use crate::domain::ports::ApiKeyMinter;

const KEY_ID_LEN: usize = 12;
const SECRET_LEN: usize = 40;

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Mints keys from the thread-local CSPRNG and digests secrets with SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256ApiKeyMinter;

impl Sha256ApiKeyMinter {
    /// Lowercase hex SHA-256 of `secret`, as stored.
    #[must_use]
    pub fn digest(secret: &str) -> String {
        hex::encode(Sha256::digest(secret.as_bytes()))
    }
}

impl ApiKeyMinter for Sha256ApiKeyMinter {
    fn mint(&self) -> IssuedApiKey {
        let secret = Zeroizing::new(random_alphanumeric(SECRET_LEN));
        let secret_digest = Self::digest(&secret);
        IssuedApiKey {
            key_id: random_alphanumeric(KEY_ID_LEN),
            secret,
            secret_digest,
        }
    }

    fn verify(&self, secret: &str, stored_digest: &str) -> bool {
        Self::digest(secret)
            .as_bytes()
            .ct_eq(stored_digest.as_bytes())
            .into()
    }
}
