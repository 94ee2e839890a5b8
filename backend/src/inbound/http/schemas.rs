//! OpenAPI schema definitions for envelopes and domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the JSON written by [`super::envelope`] but
//! live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request collides with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The caller exceeded a rate limit.
    #[schema(rename = "too_many_requests")]
    TooManyRequests,
    /// A dependency is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::ValidationIssue`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ValidationIssue)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ValidationIssueSchema {
    /// Issue category.
    #[schema(example = "too_small")]
    code: String,
    /// Field path the issue applies to.
    #[schema(example = json!(["name"]))]
    path: Vec<String>,
    /// Human-readable explanation.
    #[schema(example = "name must not be empty")]
    message: String,
    /// Offending value, when useful.
    received: Option<serde_json::Value>,
    /// Accepted values for enum fields.
    options: Option<Vec<String>>,
}

/// Error detail inside the failure envelope.
#[derive(ToSchema)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorBodySchema {
    /// Numeric code; the first three digits are the HTTP status.
    #[schema(example = 4040)]
    error_code: u16,
    /// Stable machine-readable error code.
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "car not found")]
    message: String,
    /// Field-level validation failures.
    issues: Option<Vec<ValidationIssueSchema>>,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Error`] as rendered over HTTP.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Always `false`.
    #[schema(example = false)]
    success: bool,
    error: ErrorBodySchema,
}

/// Success envelope around `data`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SuccessSchema<T: ToSchema> {
    /// Always `true`.
    #[schema(example = true)]
    success: bool,
    data: T,
    /// Optional human-readable note.
    message: Option<String>,
}

/// Success envelope for commands that return no data.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AckSchema {
    /// Always `true`.
    #[schema(example = true)]
    success: bool,
    /// Always `null`.
    data: Option<serde_json::Value>,
    #[schema(example = "Car deleted")]
    message: String,
}

/// OpenAPI schema for [`pagination::PageMeta`].
#[derive(ToSchema)]
#[schema(as = pagination::PageMeta)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageMetaSchema {
    /// Items matching the query across all pages.
    #[schema(example = 42)]
    total: u64,
    /// One-based page number.
    #[schema(example = 1)]
    page: u32,
    /// Items per page.
    #[schema(example = 20)]
    limit: u32,
    /// Number of pages at this limit.
    #[schema(example = 3)]
    total_pages: u32,
}

/// OpenAPI schema for [`pagination::Page`].
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageSchema<T: ToSchema> {
    items: Vec<T>,
    meta: PageMetaSchema,
}
