//! Drug catalog endpoints. Read-only and open without a token.
//!
//! - `GET /api/v1/medications`: active entries, optional `drug_class`, `skip`, `limit`
//! - `GET /api/v1/medications/search?q=`: name search, `limit` up to 50
//! - `GET /api/v1/medications/:id`
//! - `GET /api/v1/medications/classes/`

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Page};
use crate::catalog::DEFAULT_SEARCH_LIMIT;
use crate::models::{Medication, MedicationSearchResult};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MedicationListQuery {
    pub drug_class: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl MedicationListQuery {
    fn page(&self) -> Page {
        let default = Page::default();
        Page {
            skip: self.skip.unwrap_or(default.skip),
            limit: self.limit.unwrap_or(default.limit),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<MedicationListQuery>,
) -> Json<Vec<Medication>> {
    let page = query.page();
    Json(
        ctx.catalog
            .list(query.drug_class.as_deref(), page.skip, page.limit),
    )
}

pub async fn search(
    State(ctx): State<ApiContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<MedicationSearchResult>>, ApiError> {
    Ok(Json(ctx.catalog.search(&query.q, query.limit)?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Medication>, ApiError> {
    Ok(Json(ctx.catalog.get(id)?.clone()))
}

pub async fn classes(State(ctx): State<ApiContext>) -> Json<Vec<String>> {
    Json(ctx.catalog.classes())
}
