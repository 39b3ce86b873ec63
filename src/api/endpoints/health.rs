//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub patients_revision: u64,
    pub prescriptions_revision: u64,
}

/// `GET /api/v1/health`: unauthenticated liveness check.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let revisions = ctx.store.revisions();
    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        patients_revision: revisions.patients,
        prescriptions_revision: revisions.prescriptions,
    }))
}
