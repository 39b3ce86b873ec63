//! Dashboard endpoints for the authenticated doctor's data.

use axum::extract::State;
use axum::{Extension, Json};

use crate::analytics::AnalyticsSummary;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::integrity::{check_integrity, IntegrityReport};

/// `GET /api/v1/analytics`
pub async fn summary(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    let summary = ctx
        .analytics
        .summary(&ctx.store, Some(doctor.doctor_id()))
        .await?;
    Ok(Json(summary.as_ref().clone()))
}

/// `GET /api/v1/integrity`: referential problems in the doctor's prescriptions.
pub async fn integrity(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<IntegrityReport>, ApiError> {
    let patients = ctx.store.patients().list().await?;
    let mut prescriptions = ctx.store.prescriptions().list().await?;
    prescriptions.retain(|rx| rx.doctor_id == doctor.doctor_id());
    Ok(Json(check_integrity(&patients, &prescriptions)))
}
