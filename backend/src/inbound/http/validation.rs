//! Shared validation helpers for inbound HTTP adapters.
//!
//! Query strings go through [`ValidatedQuery`], which applies the endpoint's
//! declared [`QueryField`](super::query_schema::QueryField)s before
//! deserializing. JSON bodies are checked field by field with [`FieldIssues`]
//! so one response reports every bad field at once.

use std::collections::HashMap;
use std::ops::Deref;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use pagination::PageRequest;
use serde_json::{Map, Value};

use crate::domain::catalog::CatalogValidationError;
use crate::domain::{
    CredentialValidationError, Error, IssueCode, UserValidationError, ValidationIssue,
};

use super::query_schema::{QueryParams, validate_fields};

/// Domain validation errors that can describe themselves as an issue.
pub trait ToIssue {
    fn to_issue(&self) -> ValidationIssue;
}

impl ToIssue for CatalogValidationError {
    fn to_issue(&self) -> ValidationIssue {
        Self::to_issue(self)
    }
}

impl ToIssue for UserValidationError {
    fn to_issue(&self) -> ValidationIssue {
        Self::to_issue(self)
    }
}

impl ToIssue for CredentialValidationError {
    fn to_issue(&self) -> ValidationIssue {
        Self::to_issue(self)
    }
}

/// Validation error for a single field.
pub fn invalid_field(field: &str, err: &impl ToIssue) -> Error {
    Error::validation([err.to_issue().at(field)])
}

/// Collector for per-field validation failures.
#[derive(Debug, Default)]
pub struct FieldIssues {
    issues: Vec<ValidationIssue>,
}

impl FieldIssues {
    /// Record the failure of `result` under `field`, passing values through.
    pub fn check<T, E: ToIssue>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.issues.push(err.to_issue().at(field));
                None
            }
        }
    }

    /// Like [`Self::check`] for a field that may be absent. The outer
    /// `Option` is `None` only when the field failed.
    pub fn check_optional<T, E: ToIssue>(
        &mut self,
        field: &str,
        result: Option<Result<T, E>>,
    ) -> Option<Option<T>> {
        match result {
            None => Some(None),
            Some(result) => self.check(field, result).map(Some),
        }
    }

    /// Fail with every collected issue, or yield `value`.
    ///
    /// `value` is `None` only when a check failed, so an empty collector
    /// with no value indicates a handler bug.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, Error> {
        if !self.issues.is_empty() {
            return Err(Error::validation(self.issues));
        }
        value.ok_or_else(|| Error::internal("validated request produced no value"))
    }
}

fn query_map(query_string: &str) -> Result<Map<String, Value>, Error> {
    let pairs = web::Query::<HashMap<String, String>>::from_query(query_string)
        .map_err(|err| query_payload_error(&err))?;
    Ok(pairs
        .into_inner()
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect())
}

/// Validate raw input against `T`'s declared fields and deserialize it.
pub fn parse_params<T: QueryParams>(input: &Map<String, Value>) -> Result<T, Error> {
    let fields = T::fields();
    let coerced = validate_fields(&fields, input).map_err(Error::validation)?;
    serde_json::from_value(Value::Object(coerced)).map_err(|err| {
        Error::validation([ValidationIssue::new(IssueCode::InvalidType, err.to_string())])
    })
}

/// Query string extractor validated by the endpoint's declared schema.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> ValidatedQuery<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: QueryParams> FromRequest for ValidatedQuery<T> {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            query_map(req.query_string())
                .and_then(|input| parse_params::<T>(&input))
                .map(ValidatedQuery),
        )
    }
}

fn query_payload_error(err: &QueryPayloadError) -> Error {
    Error::invalid_request(format!("malformed query string: {err}"))
}

/// Map JSON body failures to the error envelope.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let error = match &err {
        JsonPayloadError::Deserialize(inner) => Error::validation([ValidationIssue::new(
            IssueCode::InvalidType,
            inner.to_string(),
        )]),
        JsonPayloadError::ContentType => {
            Error::invalid_request("request body must be application/json")
        }
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            Error::invalid_request("request body is too large")
        }
        other => Error::invalid_request(format!("malformed request body: {other}")),
    };
    error.into()
}

/// JSON extractor configuration used by every body-accepting route.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(json_error)
}

/// Page request from already range-checked `page` and `limit` values.
pub fn page_request(page: u32, limit: u32) -> Result<PageRequest, Error> {
    PageRequest::new(page, limit).map_err(|err| Error::invalid_request(err.to_string()))
}

/// Parse a path identifier, reporting failures under `field`.
pub fn parse_id<'a, T, E: ToIssue>(
    field: &str,
    raw: &'a str,
    parse: impl FnOnce(&'a str) -> Result<T, E>,
) -> Result<T, Error> {
    parse(raw).map_err(|err| invalid_field(field, &err))
}
