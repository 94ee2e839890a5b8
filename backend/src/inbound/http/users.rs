//! User account HTTP handlers.
//!
//! ```text
//! GET    /api/v1/users                 (admin)
//! GET    /api/v1/users/me
//! PATCH  /api/v1/users/me              {"firstName":"Ada"}
//! POST   /api/v1/users/me/api-key
//! GET    /api/v1/users/{id}            (admin or self)
//! PATCH  /api/v1/users/{id}/role       {"role":"admin"} (admin)
//! DELETE /api/v1/users/{id}            (admin or self)
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    IssuedApiKey, PersonName, ProfileUpdate, Role, User, UserFilter, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, done, ok};
use crate::inbound::http::principal::Authenticated;
use crate::inbound::http::query_schema::{
    QueryField, QueryParams, QuerySchema, document_query_params, pagination_fields,
};
use crate::inbound::http::schemas::{AckSchema, ErrorSchema, PageSchema, SuccessSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldIssues, ValidatedQuery, invalid_field, page_request, parse_id,
};

const ROLE_OPTIONS: &[&str] = &["admin", "user"];

/// Account as returned to clients. Credentials never leave the server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "user")]
    pub role: String,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada")]
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.to_string(),
            role: value.role.to_string(),
            first_name: value.first_name.into(),
            last_name: value.last_name.into(),
            username: value.username.into(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Query parameters for `GET /api/v1/users`.
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: u32,
    pub limit: u32,
    pub role: Option<String>,
}

impl QueryParams for UserListQuery {
    fn fields() -> Vec<QueryField> {
        let mut fields = pagination_fields().to_vec();
        fields.push(QueryField::new(
            "role",
            "Only users with this role.",
            QuerySchema::one_of(ROLE_OPTIONS).optional(),
        ));
        fields
    }
}

document_query_params!(UserListQuery);

impl UserListQuery {
    /// Domain filter and page for this query.
    pub fn into_parts(self) -> ApiResult<(UserFilter, PageRequest)> {
        let role = self
            .role
            .as_deref()
            .map(|raw| parse_role("role", raw))
            .transpose()?;
        Ok((UserFilter { role }, page_request(self.page, self.limit)?))
    }
}

/// Body for `PATCH /api/v1/users/me`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateProfileRequest {
    /// Validate into a domain update.
    pub fn into_update(self) -> ApiResult<ProfileUpdate> {
        let mut fields = FieldIssues::default();
        let first_name = fields.check_optional("firstName", self.first_name.map(PersonName::new));
        let last_name = fields.check_optional("lastName", self.last_name.map(PersonName::new));
        let (first_name, last_name) = fields.finish(first_name.zip(last_name))?;
        ProfileUpdate::new(first_name, last_name).map_err(|err| invalid_field("body", &err))
    }
}

/// Body for `PATCH /api/v1/users/{id}/role`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ChangeRoleRequest {
    #[schema(example = "admin")]
    pub role: String,
}

/// Freshly issued API key. The full key is shown once.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    /// Send this as the `X-API-Key` header.
    #[schema(example = "k7f3a9c2e1b4.Qm9vZ2llV29vZ2llU2VjcmV0")]
    pub api_key: String,
    /// Public half, safe to log.
    #[schema(example = "k7f3a9c2e1b4")]
    pub key_id: String,
}

impl From<IssuedApiKey> for ApiKeyResponse {
    fn from(value: IssuedApiKey) -> Self {
        Self {
            api_key: value.token().to_string(),
            key_id: value.key_id,
        }
    }
}

/// Parse a user id path segment.
pub fn user_id(raw: &str) -> ApiResult<UserId> {
    parse_id("id", raw, UserId::new)
}

/// Parse a role name.
pub fn parse_role(field: &str, raw: &str) -> ApiResult<Role> {
    raw.parse::<Role>().map_err(|err| invalid_field(field, &err))
}

/// Page through users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = SuccessSchema<PageSchema<UserResponse>>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("bearer" = []), ("apiKey" = []))
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    auth: Authenticated,
    query: ValidatedQuery<UserListQuery>,
) -> ApiResult<HttpResponse> {
    let (filter, page) = query.into_inner().into_parts()?;
    let users = state.users.list(auth.principal(), filter, page).await?;
    Ok(ok(users.map(UserResponse::from)))
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = SuccessSchema<UserResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getCurrentUser",
    security(("bearer" = []), ("apiKey" = []))
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    let user = state.users.me(auth.principal()).await?;
    Ok(ok(UserResponse::from(user)))
}

/// Update the caller's names.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = SuccessSchema<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser",
    security(("bearer" = []), ("apiKey" = []))
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<HttpResponse> {
    let update = payload.into_inner().into_update()?;
    let user = state.users.update_profile(auth.principal(), update).await?;
    Ok(ok(UserResponse::from(user)))
}

/// Issue (or replace) the caller's API key.
#[utoipa::path(
    post,
    path = "/api/v1/users/me/api-key",
    responses(
        (status = 201, description = "New API key", body = SuccessSchema<ApiKeyResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "issueApiKey",
    security(("bearer" = []), ("apiKey" = []))
)]
#[post("/users/me/api-key")]
pub async fn issue_api_key(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    let key = state.users.issue_api_key(auth.principal()).await?;
    Ok(created(ApiKeyResponse::from(key)))
}

/// Fetch a user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = SuccessSchema<UserResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("bearer" = []), ("apiKey" = []))
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    let user = state.users.get(auth.principal(), id).await?;
    Ok(ok(UserResponse::from(user)))
}

/// Change a user's role.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Updated user", body = SuccessSchema<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changeUserRole",
    security(("bearer" = []), ("apiKey" = []))
)]
#[patch("/users/{id}/role")]
pub async fn change_role(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
    payload: web::Json<ChangeRoleRequest>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    let role = parse_role("role", &payload.role)?;
    let user = state.users.change_role(auth.principal(), id, role).await?;
    Ok(ok(UserResponse::from(user)))
}

/// Soft-delete an account.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = AckSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser",
    security(("bearer" = []), ("apiKey" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = user_id(&path)?;
    state.users.delete(auth.principal(), id).await?;
    Ok(done("User deleted"))
}

/// Register user routes. `/users/me` routes precede `/users/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(current_user)
        .service(update_current_user)
        .service(issue_api_key)
        .service(get_user)
        .service(change_role)
        .service(delete_user);
}
