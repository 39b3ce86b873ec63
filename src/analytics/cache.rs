use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::aggregate::compute_analytics;
use super::types::AnalyticsSummary;
use crate::store::{MockStore, Record, Revisions, StoreError};

/// Memoizes summaries per owner scope, recomputing only after a store write.
///
/// `None` scope covers every record; `Some(doctor_id)` only that doctor's.
#[derive(Debug, Default)]
pub struct AnalyticsCache {
    entries: Mutex<HashMap<Option<i64>, (Revisions, Arc<AnalyticsSummary>)>>,
}

impl AnalyticsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn summary(
        &self,
        store: &MockStore,
        doctor_id: Option<i64>,
    ) -> Result<Arc<AnalyticsSummary>, StoreError> {
        // Taken before reading so a concurrent write forces a later recompute.
        let revisions = store.revisions();

        if let Some((cached_at, summary)) = self.entries.lock().await.get(&doctor_id) {
            if *cached_at == revisions {
                tracing::debug!(?doctor_id, "Analytics served from cache");
                return Ok(summary.clone());
            }
        }

        let mut patients = store.patients().list().await?;
        let mut prescriptions = store.prescriptions().list().await?;
        if let Some(owner) = doctor_id {
            patients.retain(|p| p.doctor_id() == owner);
            prescriptions.retain(|rx| rx.doctor_id() == owner);
        }

        let summary = Arc::new(compute_analytics(&patients, &prescriptions));
        tracing::debug!(
            ?doctor_id,
            patients = patients.len(),
            prescriptions = prescriptions.len(),
            "Analytics recomputed"
        );
        self.entries
            .lock()
            .await
            .insert(doctor_id, (revisions, summary.clone()));
        Ok(summary)
    }
}
