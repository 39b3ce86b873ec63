//! Mock data store: async CRUD over the patient and prescription collections.
//!
//! Each collection lives as one JSON array under a fixed key of a
//! `KeyValueStorage`. Operations sleep for the configured latency before
//! touching storage so callers see realistic timings, and can be bounded by a
//! timeout. Mutations are serialized through an async write lock; every
//! persist bumps the collection's revision, which the analytics cache keys on.

mod records;
mod seed;

pub use seed::SeedData;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::{SeedPolicy, StoreOptions};
use crate::db::{self, keys, DatabaseError, KeyValueStorage, MemoryStorage};
use crate::models::{Patient, Prescription};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("No account registered for {email}")]
    UserNotFound { email: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Storage error: {0}")]
    Database(#[from] DatabaseError),
}

impl StoreError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// An entity kept in the mock store.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Payload accepted by `create`.
    type Create: Send;
    /// Partial edit accepted by `update`.
    type Update: Send;

    /// Human-readable entity name for errors and logs.
    const ENTITY: &'static str;
    /// Storage key holding the JSON array.
    const KEY: &'static str;

    fn id(&self) -> i64;

    fn doctor_id(&self) -> i64;

    /// Build a new record, validating the payload.
    fn build(
        id: i64,
        doctor_id: i64,
        now: DateTime<Utc>,
        data: Self::Create,
    ) -> Result<Self, StoreError>;

    /// Merge a partial edit, validating it against the current state.
    fn merge(&mut self, update: Self::Update, now: DateTime<Utc>) -> Result<(), StoreError>;

    fn seed_slice(seed: &SeedData) -> &[Self];

    fn revision(revisions: &RevisionCounters) -> &AtomicU64;
}

/// Write counters per collection.
#[derive(Debug, Default)]
pub struct RevisionCounters {
    patients: AtomicU64,
    prescriptions: AtomicU64,
}

/// Snapshot of both collection revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Revisions {
    pub patients: u64,
    pub prescriptions: u64,
}

pub struct MockStore {
    storage: Arc<dyn KeyValueStorage>,
    seed: SeedData,
    options: StoreOptions,
    write_lock: tokio::sync::Mutex<()>,
    revisions: RevisionCounters,
}

impl MockStore {
    /// Open a store over `storage`, applying the configured seed policy.
    pub fn open(
        storage: Arc<dyn KeyValueStorage>,
        seed: SeedData,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        let store = Self {
            storage,
            seed,
            options,
            write_lock: tokio::sync::Mutex::new(()),
            revisions: RevisionCounters::default(),
        };

        match store.options.seed_policy {
            SeedPolicy::Reset => store.reseed()?,
            SeedPolicy::IfAbsent => {
                store.seed_if_absent::<Patient>()?;
                store.seed_if_absent::<Prescription>()?;
            }
            SeedPolicy::Never => {}
        }

        tracing::info!(
            policy = ?store.options.seed_policy,
            seed_patients = store.seed.patients.len(),
            seed_prescriptions = store.seed.prescriptions.len(),
            "Mock store opened"
        );
        Ok(store)
    }

    /// Fresh in-memory store holding `seed`, without simulated latency.
    pub fn in_memory(seed: SeedData) -> Result<Self, StoreError> {
        Self::open(
            Arc::new(MemoryStorage::new()),
            seed,
            StoreOptions::instant(),
        )
    }

    pub fn patients(&self) -> Collection<'_, Patient> {
        Collection::new(self)
    }

    pub fn prescriptions(&self) -> Collection<'_, Prescription> {
        Collection::new(self)
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    pub fn revisions(&self) -> Revisions {
        Revisions {
            patients: self.revisions.patients.load(Ordering::Acquire),
            prescriptions: self.revisions.prescriptions.load(Ordering::Acquire),
        }
    }

    /// Clear both collections and write the seed again.
    pub fn reseed(&self) -> Result<(), StoreError> {
        self.storage.remove_item(keys::PATIENTS)?;
        self.storage.remove_item(keys::PRESCRIPTIONS)?;
        self.write_collection(&self.seed.patients)?;
        self.write_collection(&self.seed.prescriptions)?;
        Ok(())
    }

    fn seed_if_absent<T: Record>(&self) -> Result<(), StoreError> {
        if self.storage.get_item(T::KEY)?.is_none() {
            self.write_collection(T::seed_slice(&self.seed))?;
        }
        Ok(())
    }

    fn read_collection<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let stored: Option<Vec<T>> = db::read_json(self.storage.as_ref(), T::KEY)?;
        Ok(stored.unwrap_or_else(|| T::seed_slice(&self.seed).to_vec()))
    }

    fn write_collection<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        db::write_json(self.storage.as_ref(), T::KEY, records)?;
        T::revision(&self.revisions).fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Sleep for `delay`, then run `work`, all under the optional timeout.
    async fn simulate<T, F>(
        &self,
        operation: &'static str,
        delay: Duration,
        work: F,
    ) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let run = async {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            work.await
        };

        match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                tracing::warn!(operation, limit_ms = limit.as_millis() as u64, "Store operation timed out");
                StoreError::Timeout {
                    operation,
                    after: limit,
                }
            })?,
            None => run.await,
        }
    }
}

/// Time-based identifier, bumped past the largest existing id if the clock lags.
fn next_id<T: Record>(records: &[T], now: DateTime<Utc>) -> i64 {
    let max_existing = records.iter().map(Record::id).max().unwrap_or(0);
    now.timestamp_millis().max(max_existing + 1)
}

/// Uniform CRUD handle over one collection of a `MockStore`.
pub struct Collection<'a, T: Record> {
    store: &'a MockStore,
    _record: PhantomData<T>,
}

impl<'a, T: Record> Collection<'a, T> {
    fn new(store: &'a MockStore) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// All records in write order. Falls back to the seed when nothing is stored.
    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        let store = self.store;
        store
            .simulate("list", store.options.latency.list, async {
                let records = store.read_collection::<T>()?;
                tracing::debug!(entity = T::ENTITY, count = records.len(), "Listed records");
                Ok(records)
            })
            .await
    }

    pub async fn get(&self, id: i64) -> Result<T, StoreError> {
        let store = self.store;
        store
            .simulate("get", store.options.latency.get, async {
                store
                    .read_collection::<T>()?
                    .into_iter()
                    .find(|r| r.id() == id)
                    .ok_or(StoreError::NotFound {
                        entity: T::ENTITY,
                        id,
                    })
            })
            .await
    }

    /// Create a record owned by the store's default doctor.
    pub async fn create(&self, data: T::Create) -> Result<T, StoreError> {
        self.create_for(self.store.options.default_doctor_id, data)
            .await
    }

    pub async fn create_for(&self, doctor_id: i64, data: T::Create) -> Result<T, StoreError> {
        let store = self.store;
        store
            .simulate("create", store.options.latency.create, async {
                let _guard = store.write_lock.lock().await;
                let mut records = store.read_collection::<T>()?;
                let now = Utc::now();
                let record = T::build(next_id(&records, now), doctor_id, now, data)?;
                records.push(record.clone());
                store.write_collection(&records)?;
                tracing::info!(entity = T::ENTITY, id = record.id(), doctor_id, "Created record");
                Ok(record)
            })
            .await
    }

    pub async fn update(&self, id: i64, update: T::Update) -> Result<T, StoreError> {
        let store = self.store;
        store
            .simulate("update", store.options.latency.update, async {
                let _guard = store.write_lock.lock().await;
                let mut records = store.read_collection::<T>()?;
                let record = records
                    .iter_mut()
                    .find(|r| r.id() == id)
                    .ok_or(StoreError::NotFound {
                        entity: T::ENTITY,
                        id,
                    })?;
                record.merge(update, Utc::now())?;
                let merged = record.clone();
                store.write_collection(&records)?;
                tracing::info!(entity = T::ENTITY, id, "Updated record");
                Ok(merged)
            })
            .await
    }

    /// Remove a record. `Ok(false)` when no record had that id.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let store = self.store;
        store
            .simulate("delete", store.options.latency.delete, async {
                let _guard = store.write_lock.lock().await;
                let mut records = store.read_collection::<T>()?;
                let before = records.len();
                records.retain(|r| r.id() != id);
                let removed = records.len() < before;
                if removed {
                    store.write_collection(&records)?;
                    tracing::info!(entity = T::ENTITY, id, "Deleted record");
                } else {
                    tracing::warn!(entity = T::ENTITY, id, "Delete of unknown id ignored");
                }
                Ok(removed)
            })
            .await
    }
}
