//! JSON envelopes wrapping every REST response.
//!
//! ```text
//! { "success": true,  "data": …, "message"?: … }
//! { "success": false, "error": { "errorCode", "code", "message", "issues"?, "traceId"? } }
//! ```

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::domain::{Error, ValidationIssue};

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T: Serialize> Success<T> {
    /// Wrap `data`.
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Render with `status`.
    pub fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// `200 OK` carrying `data`.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    Success::new(data).respond(StatusCode::OK)
}

/// `201 Created` carrying `data`.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    Success::new(data).respond(StatusCode::CREATED)
}

/// `200 OK` with a `null` payload and a message, for commands with nothing
/// to return.
pub fn done(message: &str) -> HttpResponse {
    Success::new(()).with_message(message).respond(StatusCode::OK)
}

/// Error detail inside the failure envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody<'a> {
    error_code: u16,
    code: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    issues: &'a [ValidationIssue],
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
}

/// Failure response body.
#[derive(Debug, Serialize)]
pub struct Failure<'a> {
    success: bool,
    error: ErrorBody<'a>,
}

impl<'a> From<&'a Error> for Failure<'a> {
    fn from(error: &'a Error) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                error_code: error.code().numeric(),
                code: error.code().as_str(),
                message: error.message(),
                issues: error.issues(),
                trace_id: error.trace_id(),
            },
        }
    }
}
