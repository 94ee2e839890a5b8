//! Authentication HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"firstName":"Ada","lastName":"Lovelace","username":"ada","password":"…"}
//! POST /api/v1/auth/login    {"username":"ada","password":"…"}
//! POST /api/v1/auth/refresh  (refresh_token cookie)
//! POST /api/v1/auth/logout
//! ```
//!
//! Access tokens travel in the response body; the refresh token only ever
//! travels in an HttpOnly cookie scoped to the auth routes.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{HttpRequest, HttpResponse, Scope, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    AuthSession, CredentialValidationError, Error, LoginCredentials, Password, PersonName,
    Registration, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{Success, created, done};
use crate::inbound::http::schemas::{AckSchema, ErrorSchema, SuccessSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::{FieldIssues, invalid_field};

/// Name of the refresh token cookie.
pub const REFRESH_COOKIE: &str = "refresh_token";
/// Path the refresh cookie is scoped to.
pub const REFRESH_COOKIE_PATH: &str = "/api/v1/auth";

/// Attributes applied to the refresh cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshCookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for RefreshCookiePolicy {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Strict,
        }
    }
}

impl RefreshCookiePolicy {
    /// Cookie carrying `token` for `max_age_secs` seconds.
    #[must_use]
    pub fn issue(&self, token: &str, max_age_secs: u64) -> Cookie<'static> {
        let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
        Cookie::build(REFRESH_COOKIE, token.to_owned())
            .path(REFRESH_COOKIE_PATH)
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(CookieDuration::seconds(max_age))
            .finish()
    }

    /// Expired cookie instructing the client to drop the refresh token.
    #[must_use]
    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(REFRESH_COOKIE, "")
            .path(REFRESH_COOKIE_PATH)
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .finish();
        cookie.make_removal();
        cookie
    }
}

/// Body for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "correct horse battery")]
    pub password: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let mut fields = FieldIssues::default();
        let first_name = fields.check("firstName", PersonName::new(&value.first_name));
        let last_name = fields.check("lastName", PersonName::new(&value.last_name));
        let username = fields.check("username", Username::new(&value.username));
        let password = fields.check("password", Password::new(&value.password));
        let (((first_name, last_name), username), password) = fields.finish(
            first_name
                .zip(last_name)
                .zip(username)
                .zip(password),
        )?;
        Ok(Self {
            first_name,
            last_name,
            username,
            password,
        })
    }
}

/// Body for `POST /api/v1/auth/login`.
///
/// Example JSON:
/// `{"username":"ada","password":"correct horse battery"}`
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password).map_err(|err| {
            let field = match err {
                CredentialValidationError::EmptyUsername => "username",
                _ => "password",
            };
            invalid_field(field, &err)
        })
    }
}

/// Issued access token and the account it belongs to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    #[schema(example = 900)]
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Split a session into the response body and the refresh cookie.
pub fn session_response(
    session: AuthSession,
    policy: &RefreshCookiePolicy,
) -> (LoginResponse, Cookie<'static>) {
    let AuthSession { user, tokens } = session;
    let cookie = policy.issue(&tokens.refresh_token, tokens.refresh_expires_in);
    let body = LoginResponse {
        access_token: tokens.access_token.to_string(),
        token_type: "Bearer".to_owned(),
        expires_in: tokens.expires_in,
        user: UserResponse::from(user),
    };
    (body, cookie)
}

fn respond_with_session(session: AuthSession, policy: &RefreshCookiePolicy) -> HttpResponse {
    let (body, cookie) = session_response(session, policy);
    HttpResponse::Ok().cookie(cookie).json(Success::new(body))
}

/// Create an account with the `user` role.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SuccessSchema<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username already taken", body = ErrorSchema),
        (status = 429, description = "Too many requests", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let user = state.auth.register(registration).await?;
    Ok(created(UserResponse::from(user)))
}

/// Exchange credentials for an access token and a refresh cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Login success",
            headers(("Set-Cookie" = String, description = "HttpOnly refresh_token cookie")),
            body = SuccessSchema<LoginResponse>
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 429, description = "Too many requests", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let session = state.auth.login(credentials).await?;
    Ok(respond_with_session(session, &state.refresh_cookie))
}

/// Rotate the token pair using the refresh cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    responses(
        (
            status = 200,
            description = "Tokens rotated",
            headers(("Set-Cookie" = String, description = "Replacement refresh_token cookie")),
            body = SuccessSchema<LoginResponse>
        ),
        (status = 401, description = "Missing, invalid, or expired refresh token", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "refresh",
    security([])
)]
#[post("/refresh")]
pub async fn refresh(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let cookie = req
        .cookie(REFRESH_COOKIE)
        .filter(|cookie| !cookie.value().is_empty())
        .ok_or_else(|| Error::unauthorized("refresh token missing"))?;
    let session = state.auth.refresh(cookie.value()).await?;
    Ok(respond_with_session(session, &state.refresh_cookie))
}

/// Drop the refresh cookie. Access tokens expire on their own.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "Logged out", body = AckSchema)),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>) -> HttpResponse {
    info!("refresh cookie cleared");
    let mut response = done("Logged out");
    if let Err(error) = response.add_cookie(&state.refresh_cookie.clear()) {
        tracing::error!(%error, "failed to clear refresh cookie");
    }
    response
}

/// Auth routes, mounted under `/api/v1` so the caller can attach the
/// stricter rate limit tier to this scope alone.
pub fn scope() -> Scope {
    web::scope("/auth")
        .service(register)
        .service(login)
        .service(refresh)
        .service(logout)
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
