//! Prescription endpoints.
//!
//! - `GET /api/v1/prescriptions`: list; any of `search`, `status`,
//!   `patient_id`, `sort_by`, `order` switches on filtering and sorting
//! - `POST /api/v1/prescriptions`
//! - `GET|PUT|DELETE /api/v1/prescriptions/:id`

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::owned;
use crate::api::error::{not_found_message, ApiError};
use crate::api::types::{ApiContext, DoctorContext, MessageResponse, Page};
use crate::listing::filter_prescriptions;
use crate::models::{
    Prescription, PrescriptionCreate, PrescriptionFilter, PrescriptionSortKey,
    PrescriptionStatus, PrescriptionUpdate, SortOrder,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PrescriptionListQuery {
    pub search: Option<String>,
    pub status: Option<PrescriptionStatus>,
    pub patient_id: Option<i64>,
    pub sort_by: Option<PrescriptionSortKey>,
    pub order: Option<SortOrder>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl PrescriptionListQuery {
    /// The list filter, or `None` when the stored order should be kept.
    fn filter(&self) -> Option<PrescriptionFilter> {
        let requested = self.search.is_some()
            || self.status.is_some()
            || self.patient_id.is_some()
            || self.sort_by.is_some()
            || self.order.is_some();
        requested.then(|| PrescriptionFilter {
            search: self.search.clone(),
            status: self.status,
            patient_id: self.patient_id,
            sort_by: self.sort_by.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
        })
    }

    fn page(&self) -> Page {
        let default = Page::default();
        Page {
            skip: self.skip.unwrap_or(default.skip),
            limit: self.limit.unwrap_or(default.limit),
        }
    }
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Query(query): Query<PrescriptionListQuery>,
) -> Result<Json<Vec<Prescription>>, ApiError> {
    let mut prescriptions = ctx.store.prescriptions().list().await?;
    prescriptions.retain(|rx| rx.doctor_id == doctor.doctor_id());

    if let Some(filter) = query.filter() {
        let patients = ctx.store.patients().list().await?;
        prescriptions = filter_prescriptions(&prescriptions, &patients, &filter);
    }
    Ok(Json(query.page().apply(prescriptions)))
}

/// The referenced patient must exist and belong to the caller.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Json(data): Json<PrescriptionCreate>,
) -> Result<Json<Prescription>, ApiError> {
    owned(&ctx.store.patients(), doctor.doctor_id(), data.patient_id).await?;
    let prescription = ctx
        .store
        .prescriptions()
        .create_for(doctor.doctor_id(), data)
        .await?;
    Ok(Json(prescription))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<i64>,
) -> Result<Json<Prescription>, ApiError> {
    let prescription = owned(&ctx.store.prescriptions(), doctor.doctor_id(), id).await?;
    Ok(Json(prescription))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<i64>,
    Json(update): Json<PrescriptionUpdate>,
) -> Result<Json<Prescription>, ApiError> {
    let prescriptions = ctx.store.prescriptions();
    owned(&prescriptions, doctor.doctor_id(), id).await?;
    Ok(Json(prescriptions.update(id, update).await?))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let prescriptions = ctx.store.prescriptions();
    owned(&prescriptions, doctor.doctor_id(), id).await?;
    if !prescriptions.delete(id).await? {
        return Err(ApiError::NotFound(not_found_message("Prescription")));
    }
    Ok(Json(MessageResponse::new("Назначение удалено")))
}
