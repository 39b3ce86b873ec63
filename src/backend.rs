//! Data-source seam for screens: the same CRUD surface whether records come
//! from the local mock store or the REST backend.

use std::future::Future;

use crate::analytics::{compute_analytics, AnalyticsSummary};
use crate::client::{ClientError, RestClient};
use crate::models::{
    Patient, PatientCreate, PatientUpdate, Prescription, PrescriptionCreate, PrescriptionUpdate,
};
use crate::store::{MockStore, StoreError};

/// Patient and prescription CRUD.
///
/// `delete_*` resolves to `false` when nothing was removed.
pub trait ClinicalBackend: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list_patients(&self) -> impl Future<Output = Result<Vec<Patient>, Self::Error>> + Send;

    fn get_patient(&self, id: i64) -> impl Future<Output = Result<Patient, Self::Error>> + Send;

    fn create_patient(
        &self,
        data: PatientCreate,
    ) -> impl Future<Output = Result<Patient, Self::Error>> + Send;

    fn update_patient(
        &self,
        id: i64,
        update: PatientUpdate,
    ) -> impl Future<Output = Result<Patient, Self::Error>> + Send;

    fn delete_patient(&self, id: i64) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn list_prescriptions(
        &self,
    ) -> impl Future<Output = Result<Vec<Prescription>, Self::Error>> + Send;

    fn get_prescription(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Prescription, Self::Error>> + Send;

    fn create_prescription(
        &self,
        data: PrescriptionCreate,
    ) -> impl Future<Output = Result<Prescription, Self::Error>> + Send;

    fn update_prescription(
        &self,
        id: i64,
        update: PrescriptionUpdate,
    ) -> impl Future<Output = Result<Prescription, Self::Error>> + Send;

    fn delete_prescription(&self, id: i64)
        -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

impl ClinicalBackend for MockStore {
    type Error = StoreError;

    async fn list_patients(&self) -> Result<Vec<Patient>, StoreError> {
        self.patients().list().await
    }

    async fn get_patient(&self, id: i64) -> Result<Patient, StoreError> {
        self.patients().get(id).await
    }

    async fn create_patient(&self, data: PatientCreate) -> Result<Patient, StoreError> {
        self.patients().create(data).await
    }

    async fn update_patient(&self, id: i64, update: PatientUpdate) -> Result<Patient, StoreError> {
        self.patients().update(id, update).await
    }

    async fn delete_patient(&self, id: i64) -> Result<bool, StoreError> {
        self.patients().delete(id).await
    }

    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, StoreError> {
        self.prescriptions().list().await
    }

    async fn get_prescription(&self, id: i64) -> Result<Prescription, StoreError> {
        self.prescriptions().get(id).await
    }

    async fn create_prescription(
        &self,
        data: PrescriptionCreate,
    ) -> Result<Prescription, StoreError> {
        self.prescriptions().create(data).await
    }

    async fn update_prescription(
        &self,
        id: i64,
        update: PrescriptionUpdate,
    ) -> Result<Prescription, StoreError> {
        self.prescriptions().update(id, update).await
    }

    async fn delete_prescription(&self, id: i64) -> Result<bool, StoreError> {
        self.prescriptions().delete(id).await
    }
}

impl ClinicalBackend for RestClient {
    type Error = ClientError;

    async fn list_patients(&self) -> Result<Vec<Patient>, ClientError> {
        RestClient::list_patients(self).await
    }

    async fn get_patient(&self, id: i64) -> Result<Patient, ClientError> {
        RestClient::get_patient(self, id).await
    }

    async fn create_patient(&self, data: PatientCreate) -> Result<Patient, ClientError> {
        RestClient::create_patient(self, &data).await
    }

    async fn update_patient(&self, id: i64, update: PatientUpdate) -> Result<Patient, ClientError> {
        RestClient::update_patient(self, id, &update).await
    }

    async fn delete_patient(&self, id: i64) -> Result<bool, ClientError> {
        RestClient::delete_patient(self, id).await
    }

    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, ClientError> {
        RestClient::list_prescriptions(self).await
    }

    async fn get_prescription(&self, id: i64) -> Result<Prescription, ClientError> {
        RestClient::get_prescription(self, id).await
    }

    async fn create_prescription(
        &self,
        data: PrescriptionCreate,
    ) -> Result<Prescription, ClientError> {
        RestClient::create_prescription(self, &data).await
    }

    async fn update_prescription(
        &self,
        id: i64,
        update: PrescriptionUpdate,
    ) -> Result<Prescription, ClientError> {
        RestClient::update_prescription(self, id, &update).await
    }

    async fn delete_prescription(&self, id: i64) -> Result<bool, ClientError> {
        RestClient::delete_prescription(self, id).await
    }
}

/// Fetch both collections and aggregate them for the dashboard.
pub async fn load_dashboard<B: ClinicalBackend>(backend: &B) -> Result<AnalyticsSummary, B::Error> {
    let (patients, prescriptions) =
        tokio::try_join!(backend.list_patients(), backend.list_prescriptions())?;
    tracing::debug!(
        patients = patients.len(),
        prescriptions = prescriptions.len(),
        "Dashboard data loaded"
    );
    Ok(compute_analytics(&patients, &prescriptions))
}
