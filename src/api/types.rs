//! Shared types for the REST layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsCache;
use crate::auth::AuthService;
use crate::catalog::MedicationCatalog;
use crate::models::User;
use crate::store::MockStore;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<MockStore>,
    pub auth: Arc<AuthService>,
    pub analytics: Arc<AnalyticsCache>,
    pub catalog: Arc<MedicationCatalog>,
}

impl ApiContext {
    pub fn new(store: Arc<MockStore>, auth: Arc<AuthService>) -> Self {
        Self {
            store,
            auth,
            analytics: Arc::new(AnalyticsCache::new()),
            catalog: Arc::new(MedicationCatalog::demo()),
        }
    }
}

/// Authenticated doctor, injected into request extensions by the auth
/// middleware.
#[derive(Debug, Clone)]
pub struct DoctorContext {
    pub user: User,
}

impl DoctorContext {
    pub fn doctor_id(&self) -> i64 {
        self.user.id
    }
}

/// `{ "message": ... }` acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Paging parameters accepted by list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Page {
    pub skip: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

impl Page {
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit).collect()
    }
}
