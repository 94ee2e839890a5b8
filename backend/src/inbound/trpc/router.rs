//! Actix plumbing for `/trpc/{procedure}`.

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::Value;
use tracing::debug;

use crate::domain::Error;
use crate::inbound::http::state::HttpState;

use super::procedures::{self, Caller, Kind, Reply};
use super::wire::{TrpcError, TrpcSuccess};

fn respond(reply: Reply) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    if let Some(cookie) = reply.cookie {
        response.cookie(cookie);
    }
    response.json(TrpcSuccess::new(reply.data))
}

fn expect_kind(path: &str, kind: Kind) -> Result<(), TrpcError> {
    match Kind::of(path) {
        None => Err(TrpcError::unknown_procedure(path)),
        Some(actual) if actual != kind => {
            Err(TrpcError::method_not_supported(path, actual.method()))
        }
        Some(_) => Ok(()),
    }
}

fn query_input(req: &HttpRequest, path: &str) -> Result<Value, TrpcError> {
    let params = web::Query::<HashMap<String, String>>::from_query(req.query_string())
        .map_err(|err| {
            let error = Error::invalid_request(format!("malformed query string: {err}"));
            TrpcError::new(path, error)
        })?;
    match params.get("input").map(String::as_str) {
        None | Some("") => Ok(Value::Null),
        Some(raw) => serde_json::from_str(raw).map_err(|err| TrpcError::parse_error(path, err)),
    }
}

fn mutation_input(body: &[u8], path: &str) -> Result<Value, TrpcError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|err| TrpcError::parse_error(path, err))
}

async fn run_query(
    state: web::Data<HttpState>,
    req: HttpRequest,
    procedure: web::Path<String>,
) -> Result<HttpResponse, TrpcError> {
    let path = procedure.into_inner();
    expect_kind(&path, Kind::Query)?;
    let input = query_input(&req, &path)?;
    debug!(procedure = %path, "trpc query");
    let caller = Caller::from_headers(req.headers());
    procedures::query(&state, &caller, &path, input)
        .await
        .map(respond)
        .map_err(|err| TrpcError::new(path, err))
}

async fn run_mutation(
    state: web::Data<HttpState>,
    req: HttpRequest,
    procedure: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, TrpcError> {
    let path = procedure.into_inner();
    expect_kind(&path, Kind::Mutation)?;
    let input = mutation_input(&body, &path)?;
    debug!(procedure = %path, "trpc mutation");
    let caller = Caller::from_headers(req.headers());
    procedures::mutation(&state, &caller, &path, input)
        .await
        .map(respond)
        .map_err(|err| TrpcError::new(path, err))
}

async fn unsupported_method(procedure: web::Path<String>) -> Result<HttpResponse, TrpcError> {
    let path = procedure.into_inner();
    Err(match Kind::of(&path) {
        Some(kind) => TrpcError::method_not_supported(path, kind.method()),
        None => TrpcError::unknown_procedure(path),
    })
}

/// Register the procedure endpoint. Mount under `/trpc`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{procedure}")
            .app_data(web::PayloadConfig::new(64 * 1024))
            .route(web::get().to(run_query))
            .route(web::post().to(run_mutation))
            .default_service(web::to(unsupported_method)),
    );
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
