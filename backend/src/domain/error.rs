//! Domain-level error types.
//!
//! These errors are transport agnostic. The REST and RPC adapters each map
//! them to their own envelope, but both read the same code, message, issue
//! list, and trace id from here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Stable machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The request collides with existing state.
    Conflict,
    /// The caller exceeded a rate limit.
    TooManyRequests,
    /// A dependency is temporarily unavailable; retrying may succeed.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

impl ErrorCode {
    /// Numeric code published in error envelopes.
    ///
    /// The leading three digits match the HTTP status so clients can bucket
    /// failures without a lookup table.
    #[must_use]
    pub const fn numeric(self) -> u16 {
        match self {
            Self::InvalidRequest => 4000,
            Self::Unauthorized => 4010,
            Self::Forbidden => 4030,
            Self::NotFound => 4040,
            Self::Conflict => 4090,
            Self::TooManyRequests => 4290,
            Self::InternalError => 5000,
            Self::ServiceUnavailable => 5030,
        }
    }

    /// Snake-case name used in serialised payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::TooManyRequests => "too_many_requests",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InternalError => "internal_error",
        }
    }

    const fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource conflict",
            Self::TooManyRequests => "Too many requests",
            Self::ServiceUnavailable => "Service temporarily unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Category of a single validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A required value was absent.
    Required,
    /// The value had the wrong type.
    InvalidType,
    /// The value was below its minimum (length or magnitude).
    TooSmall,
    /// The value exceeded its maximum (length or magnitude).
    TooBig,
    /// The value did not match the expected format.
    InvalidString,
    /// The value was not one of the allowed options.
    InvalidEnumValue,
    /// The key is not accepted by the endpoint.
    UnrecognizedKey,
    /// Any other rule violation.
    Custom,
}

/// One structured validation failure, addressed by a field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    code: IssueCode,
    path: Vec<String>,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    received: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
}

impl ValidationIssue {
    /// Issue without a path; adapters attach one with [`Self::at`].
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            path: Vec::new(),
            message: message.into(),
            received: None,
            options: None,
        }
    }

    /// Prefix the issue path with `segment`.
    #[must_use]
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Record the offending value.
    #[must_use]
    pub fn with_received(mut self, received: Value) -> Self {
        self.received = Some(received);
        self
    }

    /// Record the accepted values.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Issue category.
    #[must_use]
    pub const fn code(&self) -> IssueCode {
        self.code
    }

    /// Field path, outermost segment first.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Offending value, when recorded.
    #[must_use]
    pub const fn received(&self) -> Option<&Value> {
        self.received.as_ref()
    }

    /// Accepted values, when the field is an enumeration.
    #[must_use]
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }
}

/// Domain error payload.
///
/// The trace id of the surrounding request is captured at construction so
/// adapters can echo it without consulting task-local state again.
///
/// # Examples
/// ```
/// use carmarket::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("car not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.code().numeric(), 4040);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    issues: Vec<ValidationIssue>,
    trace_id: Option<String>,
}

impl Error {
    /// Create an error. Blank messages fall back to a generic message for
    /// the code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.fallback_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            issues: Vec::new(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured validation issues, empty unless the error is a validation
    /// failure.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Correlation identifier of the request that produced the error.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Attach a trace identifier, replacing any captured one.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        let trace_id = trace_id.into();
        if !trace_id.trim().is_empty() {
            self.trace_id = Some(trace_id);
        }
        self
    }

    /// Append one validation issue.
    #[must_use]
    pub fn with_issue(mut self, issue: ValidationIssue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Append several validation issues.
    #[must_use]
    pub fn with_issues(mut self, issues: impl IntoIterator<Item = ValidationIssue>) -> Self {
        self.issues.extend(issues);
        self
    }

    /// Validation failure carrying `issues`.
    pub fn validation(issues: impl IntoIterator<Item = ValidationIssue>) -> Self {
        Self::invalid_request("Validation failed").with_issues(issues)
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::TooManyRequests`].
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TooManyRequests, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests;
