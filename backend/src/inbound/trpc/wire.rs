//! tRPC response envelopes and error codes.
//!
//! ```text
//! { "result": { "data": … } }
//! { "error": { "message", "code": -32004,
//!              "data": { "code": "NOT_FOUND", "httpStatus": 404, "path": "cars.byId",
//!                        "errorCode": 4040, "issues"?: [...], "traceId"?: … } } }
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{Error, ErrorCode, ValidationIssue};
use crate::inbound::http::error::{redact_if_internal, status_for};
use crate::middleware::trace::TRACE_ID_HEADER;

/// tRPC error code, paired with its JSON-RPC number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrpcCode {
    ParseError,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotSupported,
    Conflict,
    TooManyRequests,
    ServiceUnavailable,
    InternalServerError,
}

impl TrpcCode {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParseError => "PARSE_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            Self::Conflict => "CONFLICT",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// JSON-RPC 2.0 error number.
    #[must_use]
    pub const fn json_rpc(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::BadRequest => -32600,
            Self::Unauthorized => -32001,
            Self::Forbidden => -32003,
            Self::NotFound => -32004,
            Self::MethodNotSupported => -32005,
            Self::Conflict => -32009,
            Self::TooManyRequests => -32029,
            Self::ServiceUnavailable | Self::InternalServerError => -32603,
        }
    }

    /// HTTP status used for this code.
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::ParseError | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorCode> for TrpcCode {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidRequest => Self::BadRequest,
            ErrorCode::Unauthorized => Self::Unauthorized,
            ErrorCode::Forbidden => Self::Forbidden,
            ErrorCode::NotFound => Self::NotFound,
            ErrorCode::Conflict => Self::Conflict,
            ErrorCode::TooManyRequests => Self::TooManyRequests,
            ErrorCode::ServiceUnavailable => Self::ServiceUnavailable,
            ErrorCode::InternalError => Self::InternalServerError,
        }
    }
}

/// Successful procedure result.
#[derive(Debug, Serialize)]
pub struct TrpcSuccess {
    result: TrpcResult,
}

#[derive(Debug, Serialize)]
struct TrpcResult {
    data: Value,
}

impl TrpcSuccess {
    /// Wrap `data`.
    #[must_use]
    pub const fn new(data: Value) -> Self {
        Self {
            result: TrpcResult { data },
        }
    }
}

/// Procedure failure tagged with the procedure path.
#[derive(Debug, Clone)]
pub struct TrpcError {
    code: TrpcCode,
    path: String,
    error: Error,
}

impl TrpcError {
    /// Failure of procedure `path` carrying a domain error.
    pub fn new(path: impl Into<String>, error: Error) -> Self {
        Self {
            code: error.code().into(),
            path: path.into(),
            error,
        }
    }

    /// The procedure exists but is a query called with POST, or the reverse.
    pub fn method_not_supported(path: impl Into<String>, expected: &str) -> Self {
        let path = path.into();
        let error =
            Error::invalid_request(format!("procedure '{path}' must be called with {expected}"));
        Self {
            code: TrpcCode::MethodNotSupported,
            path,
            error,
        }
    }

    /// No procedure has this path.
    pub fn unknown_procedure(path: impl Into<String>) -> Self {
        let path = path.into();
        let error = Error::not_found(format!("no procedure named '{path}'"));
        Self::new(path, error)
    }

    /// The `input` could not be parsed as JSON.
    pub fn parse_error(path: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self {
            code: TrpcCode::ParseError,
            path: path.into(),
            error: Error::invalid_request(format!("input is not valid JSON: {detail}")),
        }
    }

    /// tRPC code of this failure.
    #[must_use]
    pub const fn code(&self) -> TrpcCode {
        self.code
    }
}

/// tRPC error body for a request rejected before routing, such as by the
/// rate limiter. The procedure path is the last segment of `uri_path`.
pub fn rejection_response(uri_path: &str, error: &Error) -> HttpResponse {
    let procedure = uri_path.rsplit('/').next().unwrap_or(uri_path);
    TrpcError::new(procedure, error.clone()).error_response()
}

impl std::fmt::Display for TrpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.code.as_str(), self.error)
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorShape<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorShape<'a> {
    message: &'a str,
    code: i32,
    data: ErrorData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorData<'a> {
    code: &'static str,
    http_status: u16,
    path: &'a str,
    error_code: u16,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    issues: &'a [ValidationIssue],
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
}

impl ResponseError for TrpcError {
    fn status_code(&self) -> StatusCode {
        match self.code {
            TrpcCode::MethodNotSupported | TrpcCode::ParseError => self.code.http_status(),
            _ => status_for(self.error.code()),
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code, TrpcCode::InternalServerError) {
            tracing::error!(
                path = %self.path,
                trace_id = self.error.trace_id().unwrap_or("-"),
                message = self.error.message(),
                "procedure failed with internal error"
            );
        }
        let status = self.status_code();
        let error = redact_if_internal(&self.error);
        let body = ErrorEnvelope {
            error: ErrorShape {
                message: error.message(),
                code: self.code.json_rpc(),
                data: ErrorData {
                    code: self.code.as_str(),
                    http_status: status.as_u16(),
                    path: &self.path,
                    error_code: error.code().numeric(),
                    issues: error.issues(),
                    trace_id: error.trace_id(),
                },
            },
        };
        let mut builder = HttpResponse::build(status);
        if let Some(id) = error.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(body)
    }
}
