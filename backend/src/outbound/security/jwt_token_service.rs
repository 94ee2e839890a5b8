//! HS256 JSON Web Tokens for access and refresh credentials.
//!
//! Access and refresh tokens are signed with separate secrets and carry a
//! `typ` claim. Expiry is checked against the injected [`Clock`] rather than
//! the system time, with no leeway.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{Principal, RefreshClaims, Role, TokenPair, UserId};

const ACCESS_TYPE: &str = "access";
const REFRESH_TYPE: &str = "refresh";

/// Signing secrets for the two token families.
#[derive(Clone)]
pub struct JwtSecrets {
    access: Zeroizing<Vec<u8>>,
    refresh: Zeroizing<Vec<u8>>,
}

impl JwtSecrets {
    /// Wrap the raw access and refresh secrets.
    #[must_use]
    pub fn new(access: Vec<u8>, refresh: Vec<u8>) -> Self {
        Self {
            access: Zeroizing::new(access),
            refresh: Zeroizing::new(refresh),
        }
    }
}

impl std::fmt::Debug for JwtSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSecrets").finish_non_exhaustive()
    }
}

/// How long each token family stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::from_secs(15 * 60),
            refresh: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    typ: String,
    iat: i64,
    exp: i64,
}

/// [`TokenService`] backed by `jsonwebtoken`.
pub struct JwtTokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    lifetimes: TokenLifetimes,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a token service from its secrets, lifetimes, and clock.
    pub fn new(secrets: &JwtSecrets, lifetimes: TokenLifetimes, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is compared against `clock` after decoding.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access_encoding: EncodingKey::from_secret(&secrets.access),
            access_decoding: DecodingKey::from_secret(&secrets.access),
            refresh_encoding: EncodingKey::from_secret(&secrets.refresh),
            refresh_decoding: DecodingKey::from_secret(&secrets.refresh),
            lifetimes,
            validation,
            clock,
        }
    }

    fn sign(
        &self,
        principal: &Principal,
        typ: &str,
        ttl: Duration,
        key: &EncodingKey,
    ) -> Result<String, TokenError> {
        let issued_at = self.clock.utc().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: principal.user_id().to_string(),
            role: principal.role().as_str().to_owned(),
            typ: typ.to_owned(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn open(&self, token: &str, typ: &str, key: &DecodingKey) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, key, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            })?
            .claims;

        if claims.typ != typ {
            return Err(TokenError::invalid(format!(
                "expected a {typ} token, got {}",
                claims.typ
            )));
        }
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        Ok(claims)
    }
}

fn subject(claims: &Claims) -> Result<UserId, TokenError> {
    Uuid::parse_str(&claims.sub)
        .map(UserId::from_uuid)
        .map_err(|err| TokenError::invalid(format!("subject is not a user id: {err}")))
}

impl TokenService for JwtTokenService {
    fn issue(&self, principal: &Principal) -> Result<TokenPair, TokenError> {
        let access_token = self.sign(
            principal,
            ACCESS_TYPE,
            self.lifetimes.access,
            &self.access_encoding,
        )?;
        let refresh_token = self.sign(
            principal,
            REFRESH_TYPE,
            self.lifetimes.refresh,
            &self.refresh_encoding,
        )?;
        Ok(TokenPair {
            access_token: Zeroizing::new(access_token),
            refresh_token: Zeroizing::new(refresh_token),
            expires_in: self.lifetimes.access.as_secs(),
            refresh_expires_in: self.lifetimes.refresh.as_secs(),
        })
    }

    fn verify_access(&self, token: &str) -> Result<Principal, TokenError> {
        let claims = self.open(token, ACCESS_TYPE, &self.access_decoding)?;
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| TokenError::invalid(format!("unknown role {}", claims.role)))?;
        Ok(Principal::new(subject(&claims)?, role))
    }

    fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims = self.open(token, REFRESH_TYPE, &self.refresh_decoding)?;
        Ok(RefreshClaims {
            user_id: subject(&claims)?,
        })
    }
}

#[cfg(test)]
#[path = "jwt_token_service_tests.rs"]
mod tests;
