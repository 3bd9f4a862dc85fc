use apollo_parser::{Parser, cst};
use http_body_util::{BodyExt, Limited};
use hyper::{Method, header};
use juniper::{
    InputValue,
    http::{GraphQLBatchRequest, GraphQLRequest},
};
use std::{sync::Arc, time::Instant};

use crate::{
    api,
    db,
    prelude::*,
    store::Store,
};
use super::{Backend, Context, Request, Response, log, response};


/// Requests with a larger body are rejected.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// This is the main HTTP entry point, called for each incoming request.
pub(super) async fn handle(req: Request, ctx: Arc<Context>) -> Response {
    log::req::log(&req);
    if ctx.config.log.log_http_headers {
        log::headers::log(&req);
    }

    let method = req.method().clone();
    let path = req.uri().path().trim_end_matches('/').to_owned();
    let cors = ctx.config.http.cors;

    let mut response = match path.as_str() {
        "/graphql" if method == Method::POST || method == Method::GET => {
            handle_api(req, &ctx).await
        }
        "/graphql" if method == Method::OPTIONS && cors => response::preflight(),
        "/graphql" => response::method_not_allowed(),

        "/graphiql" if ctx.config.http.graphiql && method == Method::GET => response::graphiql(),

        _ => {
            debug!("Responding with 404 to {:?} '{}'", method, path);
            response::not_found()
        }
    };

    if cors {
        response::add_cors_headers(&mut response);
    }
    response
}

/// Handles a request to `/graphql`.
async fn handle_api(req: Request, ctx: &Context) -> Response {
    let before = Instant::now();
    let is_get = req.method() == Method::GET;

    let gql_request = match parse_request(req).await {
        Ok(r) => r,
        Err(msg) => {
            debug!("Bad GraphQL request: {msg}");
            return response::bad_request(msg);
        }
    };

    // GET requests are only allowed to read.
    if let GraphQLBatchRequest::Single(r) = &gql_request {
        if is_get && selects_mutation(&r.query, r.operation_name.as_deref()) {
            debug!("Rejecting mutation sent via GET request");
            return response::method_not_allowed();
        }
    }

    let store = match &ctx.backend {
        Backend::Postgres(pool) => match db::get_conn(pool).await {
            Ok(conn) => Store::Db(conn),
            Err(e) => {
                error!("Failed to obtain DB connection for API request: {e:#}");
                return response::service_unavailable();
            }
        },
        Backend::Sample(store) => Store::Memory(Arc::clone(store)),
    };

    let api_context = api::Context { store };
    let out = ctx.schema.execute(&gql_request, &api_context).await;

    debug!(
        "Finished /graphql request in {:.2?} (with {} SQL queries)",
        before.elapsed(),
        api_context.store.num_queries(),
    );

    response::graphql(&out)
}

async fn parse_request(req: Request) -> Result<GraphQLBatchRequest, String> {
    if req.method() == Method::GET {
        let query = req.uri().query().unwrap_or("");
        return parse_get_request(query).map(GraphQLBatchRequest::Single);
    }

    let is_raw_query = req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/graphql"));

    let body = Limited::new(req.into_body(), MAX_BODY_SIZE)
        .collect()
        .await
        .map_err(|e| format!("failed to read request body: {e}"))?
        .to_bytes();

    parse_post_body(&body, is_raw_query)
}

/// Parses the body of a POST request, which is either JSON (a single request
/// or a batch) or, for `Content-Type: application/graphql`, the query itself.
fn parse_post_body(body: &[u8], is_raw_query: bool) -> Result<GraphQLBatchRequest, String> {
    if is_raw_query {
        let query = std::str::from_utf8(body)
            .map_err(|_| "request body is not valid UTF-8".to_owned())?;
        Ok(GraphQLBatchRequest::Single(GraphQLRequest::new(query.to_owned(), None, None)))
    } else {
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON in request body: {e}"))
    }
}

/// Parses the query string of a GET request, e.g.
/// `query={client(id:"1"){name}}&variables={}&operationName=Foo`.
fn parse_get_request(query_string: &str) -> Result<GraphQLRequest, String> {
    let mut query = None;
    let mut operation_name = None;
    let mut variables = None;

    for (key, value) in form_urlencoded::parse(query_string.as_bytes()) {
        match &*key {
            "query" => query = Some(value.into_owned()),
            "operationName" => operation_name = Some(value.into_owned()),
            "variables" => {
                let parsed = serde_json::from_str::<InputValue>(&value)
                    .map_err(|e| format!("invalid 'variables' parameter: {e}"))?;
                variables = Some(parsed);
            }
            _ => {}
        }
    }

    let query = query.ok_or_else(|| "missing 'query' parameter".to_owned())?;
    Ok(GraphQLRequest::new(query, operation_name, variables))
}

/// Returns whether the operation that would be executed for this document is
/// a mutation. The operation is the one named `operation_name` or, without a
/// name, the only one in the document. Unparsable documents and unknown
/// names return `false` and are reported by the executor.
fn selects_mutation(query: &str, operation_name: Option<&str>) -> bool {
    let tree = Parser::new(query).parse();
    if tree.errors().next().is_some() {
        return false;
    }

    let operations = tree.document()
        .definitions()
        .filter_map(|def| match def {
            cst::Definition::OperationDefinition(op) => Some(op),
            _ => None,
        })
        .collect::<Vec<_>>();

    let selected = match operation_name {
        Some(wanted) => operations.into_iter()
            .find(|op| op.name().is_some_and(|n| n.text().to_string() == wanted)),
        None if operations.len() == 1 => operations.into_iter().next(),
        None => None,
    };

    selected
        .and_then(|op| op.operation_type())
        .is_some_and(|ty| ty.mutation_token().is_some())
}
