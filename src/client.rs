//! Async HTTP client for the `/api/v1` backend.
//!
//! Reads the bearer token from a `KeyValueStorage` under `keys::TOKEN`, so it
//! shares credentials with `AuthService` when both sit on the same storage.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::ErrorBody;
use crate::config::ClientConfig;
use crate::db::{self, keys, DatabaseError, KeyValueStorage};
use crate::models::{
    AuthResponse, Patient, PatientCreate, PatientUpdate, Prescription, PrescriptionCreate,
    PrescriptionUpdate, RegisterData, User,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request to {url} timed out after {after:?}")]
    NetworkTimeout { url: String, after: Duration },

    #[error("Cannot connect to {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request rejected ({status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Token storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl ClientError {
    /// Transient failures worth another attempt on an idempotent request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::NetworkTimeout { .. }
                | ClientError::Connection(_)
                | ClientError::ServerError { .. }
        )
    }
}

/// REST client for patients, prescriptions and auth.
pub struct RestClient {
    config: ClientConfig,
    http: reqwest::Client,
    tokens: Arc<dyn KeyValueStorage>,
}

impl RestClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn KeyValueStorage>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self {
            config,
            http,
            tokens,
        })
    }

    /// Client for `MEDAI_API_URL`, or the local development backend.
    pub fn from_env(tokens: Arc<dyn KeyValueStorage>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env(), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The stored bearer token, if any.
    pub fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(self.tokens.get_item(keys::TOKEN)?)
    }

    // ── Auth ────────────────────────────────────────────────

    /// Form-encoded password login. Stores the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let url = self.url("/auth/login");
        let request = self
            .http
            .post(&url)
            .form(&[("username", email), ("password", password)]);
        let response = self.send(request, &url).await?;
        let auth: AuthResponse = decode(response).await?;
        self.tokens.set_item(keys::TOKEN, &auth.access_token)?;
        tracing::info!(email, "Logged in");
        Ok(auth)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<User, ClientError> {
        self.send_json(Method::POST, "/auth/register", data).await
    }

    /// The authenticated user. Cached under `keys::USER`.
    pub async fn me(&self) -> Result<User, ClientError> {
        let user: User = self.get_json("/auth/me").await?;
        db::write_json(self.tokens.as_ref(), keys::USER, &user)?;
        Ok(user)
    }

    /// Forget the stored credential. The server keeps no logout route.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.tokens.remove_item(keys::TOKEN)?;
        self.tokens.remove_item(keys::USER)?;
        Ok(())
    }

    // ── Patients ────────────────────────────────────────────

    pub async fn list_patients(&self) -> Result<Vec<Patient>, ClientError> {
        self.get_json("/patients").await
    }

    pub async fn get_patient(&self, id: i64) -> Result<Patient, ClientError> {
        self.get_json(&format!("/patients/{id}")).await
    }

    pub async fn create_patient(&self, data: &PatientCreate) -> Result<Patient, ClientError> {
        self.send_json(Method::POST, "/patients", data).await
    }

    pub async fn update_patient(
        &self,
        id: i64,
        update: &PatientUpdate,
    ) -> Result<Patient, ClientError> {
        self.send_json(Method::PUT, &format!("/patients/{id}"), update)
            .await
    }

    /// `Ok(false)` when the server has no such patient.
    pub async fn delete_patient(&self, id: i64) -> Result<bool, ClientError> {
        self.delete(&format!("/patients/{id}")).await
    }

    // ── Prescriptions ───────────────────────────────────────

    pub async fn list_prescriptions(&self) -> Result<Vec<Prescription>, ClientError> {
        self.get_json("/prescriptions").await
    }

    pub async fn get_prescription(&self, id: i64) -> Result<Prescription, ClientError> {
        self.get_json(&format!("/prescriptions/{id}")).await
    }

    pub async fn create_prescription(
        &self,
        data: &PrescriptionCreate,
    ) -> Result<Prescription, ClientError> {
        self.send_json(Method::POST, "/prescriptions", data).await
    }

    pub async fn update_prescription(
        &self,
        id: i64,
        update: &PrescriptionUpdate,
    ) -> Result<Prescription, ClientError> {
        self.send_json(Method::PUT, &format!("/prescriptions/{id}"), update)
            .await
    }

    /// `Ok(false)` when the server has no such prescription.
    pub async fn delete_prescription(&self, id: i64) -> Result<bool, ClientError> {
        self.delete(&format!("/prescriptions/{id}")).await
    }

    // ── Transport ───────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        Ok(match self.token()? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    /// GET with retry and exponential backoff on transient failures.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        let attempts = self.config.max_attempts.max(1);
        let mut delay = self.config.retry_base_delay;
        let mut attempt = 1;

        loop {
            let request = self.authorized(self.http.get(&url))?;
            let result = match self.send(request, &url).await {
                Ok(response) => decode(response).await,
                Err(e) => Err(e),
            };
            match result {
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "GET failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.authorized(self.http.request(method, &url).json(body))?;
        let response = self.send(request, &url).await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<bool, ClientError> {
        let url = self.url(path);
        let request = self.authorized(self.http.delete(&url))?;
        match self.send(request, &url).await {
            Ok(_) => Ok(true),
            Err(ClientError::NotFound(message)) => {
                tracing::warn!(url, message, "Delete of unknown record");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Send `request` and classify the outcome.
    ///
    /// A 401 removes the stored token before surfacing `Unauthorized`.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, ClientError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::NetworkTimeout {
                    url: url.to_string(),
                    after: self.config.timeout,
                }
            } else if e.is_connect() {
                ClientError::Connection(url.to_string())
            } else {
                ClientError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        tracing::debug!(url, status = status.as_u16(), message, "Request failed");
        Err(match status {
            StatusCode::UNAUTHORIZED => {
                self.tokens.remove_item(keys::TOKEN)?;
                ClientError::Unauthorized(message)
            }
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            s if s.is_server_error() => ClientError::ServerError {
                status: s.as_u16(),
                message,
            },
            s => ClientError::BadRequest {
                status: s.as_u16(),
                message,
            },
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// The structured error message, or the raw body when it is not JSON.
async fn error_message(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::routing::get;
    use axum::Router;

    use crate::api::server::{start_api_server, ApiServer};
    use crate::api::types::ApiContext;
    use crate::auth::{AuthService, DEMO_EMAIL};
    use crate::config::AuthLatency;
    use crate::db::MemoryStorage;
    use crate::models::Gender;
    use crate::store::{MockStore, SeedData};

    fn loopback() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    async fn demo_server() -> ApiServer {
        let store = MockStore::in_memory(SeedData::demo()).unwrap();
        let auth = AuthService::new(Arc::new(MemoryStorage::new()), AuthLatency::none()).unwrap();
        let ctx = ApiContext::new(Arc::new(store), Arc::new(auth));
        start_api_server(ctx, loopback()).await.unwrap()
    }

    fn client_for(base_url: &str) -> (RestClient, Arc<MemoryStorage>) {
        let tokens = Arc::new(MemoryStorage::new());
        let config = ClientConfig {
            retry_base_delay: Duration::from_millis(10),
            ..ClientConfig::with_base_url(base_url)
        };
        (RestClient::new(config, tokens.clone()).unwrap(), tokens)
    }

    /// Serve `app` on an ephemeral loopback port, returning its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind(loopback()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn new_patient() -> PatientCreate {
        PatientCreate {
            full_name: "Орлова Вера".into(),
            age: 44,
            gender: Gender::Female,
            weight: Some(61.0),
            height: None,
            phone: None,
            email: None,
            diagnosis: Some("ФП".into()),
            comorbidities: vec![],
            lab_results: Default::default(),
            current_medications: vec![],
            allergies: vec![],
            previous_anticoagulants: vec![],
        }
    }

    #[tokio::test]
    async fn requests_without_token_are_unauthorized() {
        let mut server = demo_server().await;
        let (client, _) = client_for(&server.session.base_url());
        let err = client.list_patients().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized(_)));
        server.shutdown();
    }

    #[tokio::test]
    async fn login_persists_token_and_lists_records() {
        let mut server = demo_server().await;
        let (client, tokens) = client_for(&server.session.base_url());

        let auth = client.login(DEMO_EMAIL, "secret").await.unwrap();
        assert_eq!(auth.token_type, "bearer");
        assert_eq!(
            tokens.get_item(keys::TOKEN).unwrap().as_deref(),
            Some(auth.access_token.as_str())
        );

        assert_eq!(client.list_patients().await.unwrap().len(), 8);
        assert_eq!(client.list_prescriptions().await.unwrap().len(), 8);
        let patient = client.get_patient(1).await.unwrap();
        assert_eq!(patient.full_name, "Иванов Иван Иванович");

        let me = client.me().await.unwrap();
        assert_eq!(me.email, DEMO_EMAIL);
        assert!(tokens.get_item(keys::USER).unwrap().is_some());

        server.shutdown();
    }

    #[tokio::test]
    async fn unknown_email_is_unauthorized_without_token() {
        let mut server = demo_server().await;
        let (client, tokens) = client_for(&server.session.base_url());
        let err = client.login("ghost@medai.com", "x").await.unwrap_err();
        match err {
            ClientError::Unauthorized(message) => {
                assert_eq!(message, "Неверный email или пароль")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(tokens.get_item(keys::TOKEN).unwrap().is_none());
        server.shutdown();
    }

    #[tokio::test]
    async fn rejected_token_is_cleared() {
        let mut server = demo_server().await;
        let (client, tokens) = client_for(&server.session.base_url());
        tokens.set_item(keys::TOKEN, "demo_token_stale0000").unwrap();

        let err = client.list_patients().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized(_)));
        assert!(client.token().unwrap().is_none());
        server.shutdown();
    }

    #[tokio::test]
    async fn patient_crud_over_http() {
        let mut server = demo_server().await;
        let (client, _) = client_for(&server.session.base_url());
        client.login(DEMO_EMAIL, "").await.unwrap();

        let created = client.create_patient(&new_patient()).await.unwrap();
        assert_eq!(created.doctor_id, 1);

        let update = PatientUpdate {
            age: Some(45),
            ..Default::default()
        };
        let updated = client.update_patient(created.id, &update).await.unwrap();
        assert_eq!(updated.age, 45);
        assert_eq!(updated.full_name, "Орлова Вера");

        assert!(client.delete_patient(created.id).await.unwrap());
        assert!(!client.delete_patient(created.id).await.unwrap());
        let err = client.get_patient(created.id).await.unwrap_err();
        match err {
            ClientError::NotFound(message) => assert_eq!(message, "Пациент не найден"),
            other => panic!("unexpected error: {other:?}"),
        }

        server.shutdown();
    }

    #[tokio::test]
    async fn prescription_lifecycle_over_http() {
        let mut server = demo_server().await;
        let (client, _) = client_for(&server.session.base_url());
        client.login(DEMO_EMAIL, "").await.unwrap();

        let draft = PrescriptionCreate {
            patient_id: 3,
            recommended_medications: vec![],
            dosage: Default::default(),
            duration: None,
            instructions: Some("Контроль МНО".into()),
            ai_recommendations: vec![],
            justification: None,
            warnings: vec![],
            status: crate::models::PrescriptionStatus::Draft,
            is_ai_generated: false,
        };
        let created = client.create_prescription(&draft).await.unwrap();
        let fetched = client.get_prescription(created.id).await.unwrap();
        assert_eq!(fetched.instructions.as_deref(), Some("Контроль МНО"));

        let cancel = PrescriptionUpdate {
            status: Some(crate::models::PrescriptionStatus::Cancelled),
            ..Default::default()
        };
        client.update_prescription(created.id, &cancel).await.unwrap();

        let reopen = PrescriptionUpdate {
            status: Some(crate::models::PrescriptionStatus::Draft),
            ..Default::default()
        };
        let err = client
            .update_prescription(created.id, &reopen)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::BadRequest { status: 422, .. }));

        assert!(client.delete_prescription(created.id).await.unwrap());
        server.shutdown();
    }

    #[tokio::test]
    async fn duplicate_registration_is_conflict() {
        let mut server = demo_server().await;
        let (client, _) = client_for(&server.session.base_url());
        let data = RegisterData {
            email: DEMO_EMAIL.into(),
            password: "pw".into(),
            full_name: None,
            specialty: None,
            workplace: None,
            medical_license: None,
            phone: None,
        };
        let err = client.register(&data).await.unwrap_err();
        assert!(matches!(err, ClientError::Conflict(_)));
        server.shutdown();
    }

    #[tokio::test]
    async fn get_retries_server_errors_then_gives_up() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/patients",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::SERVICE_UNAVAILABLE, "down")
                }
            }),
        );
        let base = serve(app).await;
        let (client, _) = client_for(&base);

        let err = client.list_patients().await.unwrap_err();
        match err {
            ClientError::ServerError { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn get_recovers_after_transient_failure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/prescriptions",
            get(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                    } else {
                        (StatusCode::OK, "[]".to_string())
                    }
                }
            }),
        );
        let base = serve(app).await;
        let (client, _) = client_for(&base);

        assert!(client.list_prescriptions().await.unwrap().is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn writes_are_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/patients",
            axum::routing::post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::BAD_GATEWAY
                }
            }),
        );
        let base = serve(app).await;
        let (client, _) = client_for(&base);

        let err = client.create_patient(&new_patient()).await.unwrap_err();
        assert!(matches!(err, ClientError::ServerError { status: 502, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let app = Router::new().route(
            "/patients",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "[]"
            }),
        );
        let base = serve(app).await;
        let config = ClientConfig {
            timeout: Duration::from_millis(50),
            max_attempts: 1,
            ..ClientConfig::with_base_url(&base)
        };
        let client = RestClient::new(config, Arc::new(MemoryStorage::new())).unwrap();

        let err = client.list_patients().await.unwrap_err();
        assert!(matches!(err, ClientError::NetworkTimeout { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unreachable_server_is_connection_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let (client, _) = client_for(&format!("http://127.0.0.1:{port}"));
        let err = client.list_patients().await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = RestClient::new(
            ClientConfig::with_base_url("http://example.test/api/v1/"),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://example.test/api/v1");
    }
}
