//! The HTTP server.
//!
//! Sets up the `hyper` server, one task per connection, and catches panics
//! of request handlers. Routing and the GraphQL endpoint live in
//! `handlers.rs`.

use deadpool_postgres::Pool;
use futures::FutureExt;
use http_body_util::Full;
use hyper::{body::{Bytes, Incoming}, service::service_fn};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use std::{
    convert::Infallible,
    future::Future,
    net::{IpAddr, SocketAddr},
    panic::AssertUnwindSafe,
    sync::Arc,
};
use tokio::net::TcpListener;

use crate::{api, config::Config, prelude::*, store::MemoryStore};
use self::handlers::handle;


mod handlers;
mod log;
mod response;


/// HTTP server configuration.
#[derive(Debug, Clone, confique::Config)]
pub(crate) struct HttpConfig {
    /// The TCP port the HTTP server should listen on.
    #[config(default = 5000)]
    pub(crate) port: u16,

    /// The bind address to listen on.
    #[config(default = "127.0.0.1")]
    pub(crate) address: IpAddr,

    /// Whether to serve the interactive GraphiQL IDE at `/graphiql`.
    #[config(default = false)]
    pub(crate) graphiql: bool,

    /// Whether to allow cross origin requests to `/graphql`. If enabled,
    /// `Access-Control-Allow-*` headers are added to all responses and
    /// preflight requests are answered.
    #[config(default = true)]
    pub(crate) cors: bool,
}


type Response = hyper::Response<Full<Bytes>>;
type Request = hyper::Request<Incoming>;

/// Where the data served by the API comes from.
pub(crate) enum Backend {
    /// Each API request checks out its own connection from this pool.
    Postgres(Pool),

    /// All API requests share this store.
    Sample(Arc<MemoryStore>),
}

/// Context that the request handler has access to.
struct Context {
    schema: api::Schema,
    backend: Backend,
    config: Config,
}


/// Starts the HTTP server and runs it until the process receives Ctrl+C.
pub(crate) async fn serve(config: Config, schema: api::Schema, backend: Backend) -> Result<()> {
    let addr = SocketAddr::new(config.http.address, config.http.port);
    let listener = TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let ctx = Arc::new(Context { schema, backend, config });

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            res = listener.accept() => match res {
                Ok(v) => v,
                Err(e) => {
                    // Errors like "too many open files" are not fatal for the
                    // server as a whole.
                    warn!("Failed to accept TCP connection: {e}");
                    continue;
                }
            },
            _ = &mut shutdown => {
                info!("Received Ctrl+C, shutting down HTTP server");
                break;
            }
        };

        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let service = service_fn(move |req| {
                handle_internal_errors(handle(req, Arc::clone(&ctx)))
            });

            let res = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await;
            if let Err(e) = res {
                debug!(%peer, "Error while serving HTTP connection: {e}");
            }
        });
    }

    Ok(())
}

/// Wraps another future and catches all panics that might occur when polling
/// it. That way, we answer with `500` instead of just closing the connection.
async fn handle_internal_errors(
    future: impl Future<Output = Response>,
) -> Result<Response, Infallible> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(response) => Ok(response),
        Err(panic) => {
            // Most panics carry either a `&str` or a `String`.
            let msg = panic.downcast_ref::<String>()
                .map(|s| s.as_str())
                .or(panic.downcast_ref::<&str>().copied());

            match msg {
                Some(msg) => error!("INTERNAL SERVER ERROR: HTTP handler panicked: '{msg}'"),
                None => error!("INTERNAL SERVER ERROR: HTTP handler panicked"),
            }

            Ok(response::internal_server_error())
        }
    }
}
