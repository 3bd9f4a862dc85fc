use http_body_util::Full;
use hyper::{
    StatusCode,
    body::Bytes,
    header::{self, HeaderValue},
};
use juniper::http::{GraphQLBatchResponse, graphiql::graphiql_source};

use crate::prelude::*;
use super::Response;


const PLAIN_TEXT: &str = "text/plain; charset=UTF-8";

fn build(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Serializes the result of executing a GraphQL request. The status code is
/// `200` if no request-level error occurred, `400` otherwise.
pub(super) fn graphql(out: &GraphQLBatchResponse) -> Response {
    let status = if out.is_ok() { StatusCode::OK } else { StatusCode::BAD_REQUEST };
    match serde_json::to_vec(out) {
        Ok(body) => build(status, "application/json", body),
        Err(e) => {
            error!("Failed to serialize GraphQL response: {e}");
            internal_server_error()
        }
    }
}

pub(super) fn graphiql() -> Response {
    build(StatusCode::OK, "text/html; charset=UTF-8", graphiql_source("/graphql", None))
}

/// Answer to a CORS preflight request. The actual `Access-Control-*` headers
/// are added by [`add_cors_headers`].
pub(super) fn preflight() -> Response {
    let mut response = Response::new(Full::default());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

pub(super) fn add_cors_headers(response: &mut Response) {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

pub(super) fn not_found() -> Response {
    build(StatusCode::NOT_FOUND, PLAIN_TEXT, "404 Not found")
}

pub(super) fn method_not_allowed() -> Response {
    build(StatusCode::METHOD_NOT_ALLOWED, PLAIN_TEXT, "405 Method not allowed")
}

pub(super) fn bad_request(msg: impl Into<String>) -> Response {
    build(StatusCode::BAD_REQUEST, PLAIN_TEXT, msg.into())
}

pub(super) fn service_unavailable() -> Response {
    build(
        StatusCode::SERVICE_UNAVAILABLE,
        PLAIN_TEXT,
        "Server error: service unavailable. Potentially try again later.",
    )
}

pub(super) fn internal_server_error() -> Response {
    build(StatusCode::INTERNAL_SERVER_ERROR, PLAIN_TEXT, "Internal server error")
}
