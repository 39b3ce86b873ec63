//! Request logging middleware.
//!
//! Logs every API request with method, path, status, latency and, once auth
//! has run, the doctor id.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::DoctorContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let doctor_id = req.extensions().get::<DoctorContext>().map(|d| d.doctor_id());
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%method, path, status, elapsed_ms, ?doctor_id, "API request failed");
    } else {
        tracing::info!(%method, path, status, elapsed_ms, ?doctor_id, "API request");
    }
    response
}
