//! Authentication endpoints.
//!
//! `POST /api/v1/auth/login`: form-encoded `username` + `password`
//! `POST /api/v1/auth/register`: JSON registration data
//! `GET /api/v1/auth/me`: the authenticated doctor

use axum::extract::State;
use axum::{Extension, Form, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::models::{AuthResponse, RegisterData, User};

/// OAuth2 password-flow form. `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(ctx): State<ApiContext>,
    Form(form): Form<LoginForm>,
) -> Result<Json<AuthResponse>, ApiError> {
    let session = ctx.auth.login(&form.username, &form.password).await?;
    Ok(Json(session.token))
}

pub async fn register(
    State(ctx): State<ApiContext>,
    Json(data): Json<RegisterData>,
) -> Result<Json<User>, ApiError> {
    let session = ctx.auth.register(data).await?;
    Ok(Json(session.user))
}

pub async fn me(Extension(doctor): Extension<DoctorContext>) -> Json<User> {
    Json(doctor.user)
}
