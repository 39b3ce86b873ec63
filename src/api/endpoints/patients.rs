//! Patient endpoints.
//!
//! - `GET /api/v1/patients`: list, optional `search`, `skip`, `limit`
//! - `POST /api/v1/patients`
//! - `GET|PUT|DELETE /api/v1/patients/:id`

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::owned;
use crate::api::error::{not_found_message, ApiError};
use crate::api::types::{ApiContext, DoctorContext, MessageResponse, Page};
use crate::listing::filter_patients;
use crate::models::{Patient, PatientCreate, PatientFilter, PatientUpdate};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PatientListQuery {
    pub search: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl PatientListQuery {
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
    Query(query): Query<PatientListQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = ctx.store.patients().list().await?;
    let page = query.page();
    let filter = PatientFilter {
        search: query.search,
        doctor_id: Some(doctor.doctor_id()),
    };
    Ok(Json(page.apply(filter_patients(&patients, &filter))))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Json(data): Json<PatientCreate>,
) -> Result<Json<Patient>, ApiError> {
    let patient = ctx
        .store
        .patients()
        .create_for(doctor.doctor_id(), data)
        .await?;
    Ok(Json(patient))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    let patient = owned(&ctx.store.patients(), doctor.doctor_id(), id).await?;
    Ok(Json(patient))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<i64>,
    Json(update): Json<PatientUpdate>,
) -> Result<Json<Patient>, ApiError> {
    let patients = ctx.store.patients();
    owned(&patients, doctor.doctor_id(), id).await?;
    Ok(Json(patients.update(id, update).await?))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let patients = ctx.store.patients();
    owned(&patients, doctor.doctor_id(), id).await?;
    if !patients.delete(id).await? {
        return Err(ApiError::NotFound(not_found_message("Patient")));
    }
    Ok(Json(MessageResponse::new("Пациент удален")))
}
