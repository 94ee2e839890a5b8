//! Argon2id password hashing on the blocking thread pool.

use argon2::password_hash::{self, PasswordHash, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHasher as _};
use async_trait::async_trait;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::domain::Password;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hash of no known password, with the default parameters so
/// verifying against it costs the same as against a real account.
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0c2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Argon2id with the crate's default parameters, producing PHC strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

fn hash_blocking(password: &[u8]) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError::hashing(err.to_string()))
}

fn verify_blocking(password: &[u8], hash: &str) -> Result<bool, PasswordHashError> {
    let parsed =
        PasswordHash::new(hash).map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
    match Argon2::default().verify_password(password, &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHashError::malformed_hash(err.to_string())),
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, PasswordHashError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHashError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| PasswordHashError::hashing(err.to_string()))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &Password) -> Result<String, PasswordHashError> {
        let owned = Zeroizing::new(password.expose().to_owned());
        run_blocking(move || hash_blocking(owned.as_bytes())).await
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let owned = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        run_blocking(move || verify_blocking(owned.as_bytes(), &hash)).await
    }

    fn decoy_hash(&self) -> &'static str {
        DECOY_HASH
    }
}
