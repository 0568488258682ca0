// This file contains the HTTP surface: the `/spec` summary endpoint and static file serving.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap, Method},
    routing::get,
    Router,
};
use serde::Deserialize;
use thiserror::Error;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::loader::SpecLoader;
use crate::{load_summary, render, AppError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: hyper::Error },

    #[error("server error: {0}")]
    Serve(#[from] hyper::Error),
}

/// State shared by all requests; the loader holds no per-request data
#[derive(Debug, Clone)]
pub struct AppState {
    pub loader: Arc<SpecLoader>,
}

impl AppState {
    pub fn new(loader: SpecLoader) -> Self {
        AppState {
            loader: Arc::new(loader),
        }
    }
}

/// The `/spec` form; `uri` may come from the query string or an urlencoded POST body
#[derive(Debug, Deserialize)]
pub struct SpecForm {
    #[serde(default)]
    pub uri: String,
}

/// Build the application router
pub fn router<P: AsRef<Path>>(state: AppState, static_dir: P) -> Router {
    Router::new()
        .route("/spec", get(spec_handler).post(spec_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on `addr` until Ctrl-C is received
pub async fn serve(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    let server = axum::Server::try_bind(&addr)
        .map_err(|source| ServerError::Bind { addr, source })?
        .serve(app.into_make_service());

    info!("Starting server at {}", server.local_addr());

    server.with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// `GET|POST /spec?uri=...`: always 200, failures are reported as an `err:` line
async fn spec_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    query: Result<Query<SpecForm>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> String {
    let request_id = Uuid::new_v4();
    let uri = requested_uri(&method, &headers, query, body);
    let span = info_span!("spec", %request_id, uri = %uri.as_deref().unwrap_or_default());

    async move {
        // The summary is complete in `out` before the response is sent; a failed
        // render leaves the lines written so far ahead of the error line.
        let mut out = Vec::new();

        let result = match uri {
            Ok(uri) => write_summary(&state.loader, &uri, &mut out).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(operations) => info!(operations, "rendered summary"),
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "request failed");
                out.extend_from_slice(format!("err: {}\n", err).as_bytes());
            }
        }

        String::from_utf8_lossy(&out).into_owned()
    }
    .instrument(span)
    .await
}

/// The `uri` form value: an urlencoded POST body wins over the query string.
/// Bodies of any other content type are ignored.
fn requested_uri(
    method: &Method,
    headers: &HeaderMap,
    query: Result<Query<SpecForm>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> crate::Result<String> {
    let body = body.map_err(|rejection| AppError::Input(rejection.to_string()))?;

    if *method == Method::POST && is_urlencoded(headers) {
        let field = url::form_urlencoded::parse(&body).find(|(key, _)| key == "uri");
        if let Some((_, value)) = field {
            return Ok(value.into_owned());
        }
    }

    let Query(form) = query.map_err(|rejection| AppError::Input(rejection.to_string()))?;
    Ok(form.uri)
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map_or(false, |mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

async fn write_summary(loader: &SpecLoader, uri: &str, out: &mut Vec<u8>) -> crate::Result<usize> {
    let spec = load_summary(loader, uri).await?;
    render(&spec, out)?;

    Ok(spec.operation_count())
}
