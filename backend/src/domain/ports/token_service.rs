//! Port for signed access and refresh tokens.

use crate::domain::{Principal, RefreshClaims, TokenPair};

use super::define_port_error;

define_port_error! {
    /// Failures raised by token adapters.
    pub enum TokenError {
        /// Signature, audience, or claim shape did not check out.
        Invalid { message: String } => "token rejected: {message}",
        /// The token was well formed but has expired.
        Expired => "token expired",
        /// A token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues and verifies bearer tokens.
///
/// Access and refresh tokens are signed with different keys, so one can
/// never be replayed as the other.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Mint a fresh access/refresh pair for `principal`.
    fn issue(&self, principal: &Principal) -> Result<TokenPair, TokenError>;

    /// Verify an access token and recover the principal it was issued to.
    fn verify_access(&self, token: &str) -> Result<Principal, TokenError>;

    /// Verify a refresh token.
    fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError>;
}
