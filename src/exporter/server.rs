//! Metrics HTTP endpoint
//!
//! Serves `/metrics` from a shared [`VolumeMetrics`] and `/healthz` for probes.

use crate::error::{Error, Result};
use crate::exporter::metrics::VolumeMetrics;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Route a single request
pub fn respond(metrics: &VolumeMetrics, req: &Request<Body>) -> Response<Body> {
    let (status, content_type, body) = match req.uri().path() {
        "/metrics" => match metrics.encode() {
            Ok(text) => (StatusCode::OK, metrics.content_type(), text),
            Err(e) => {
                error!("Failed to encode metrics: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "text/plain".to_string(),
                    e.to_string(),
                )
            }
        },
        "/healthz" | "/livez" | "/readyz" => {
            (StatusCode::OK, "text/plain".to_string(), "ok".to_string())
        }
        _ => (
            StatusCode::NOT_FOUND,
            "text/plain".to_string(),
            "not found".to_string(),
        ),
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Ok(value) = content_type.parse() {
        response.headers_mut().insert(hyper::header::CONTENT_TYPE, value);
    }
    response
}

/// Serve metrics until the server fails
pub async fn run_metrics_server(addr: &str, metrics: Arc<VolumeMetrics>) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Configuration(format!("Invalid listen address {}: {}", addr, e)))?;

    let make_svc = make_service_fn(move |_conn| {
        let metrics = metrics.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let response = respond(&metrics, &req);
                async move { Ok::<_, Infallible>(response) }
            }))
        }
    });

    info!("Metrics server listening on {}", addr);
    Server::try_bind(&addr)
        .map_err(|e| Error::Internal(format!("Metrics server bind error: {}", e)))?
        .serve(make_svc)
        .await
        .map_err(|e| Error::Internal(format!("Metrics server error: {}", e)))?;

    Ok(())
}
