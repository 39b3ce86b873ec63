use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MedAI";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the REST base URL.
pub const API_URL_ENV: &str = "MEDAI_API_URL";

/// Base URL used when `MEDAI_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Request timeout for the REST client.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Environment variable overriding the address `run()` serves on.
pub const BIND_ADDR_ENV: &str = "MEDAI_BIND_ADDR";

/// Address the development backend listens on by default.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Filter applied when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medai=info,tower_http=warn"
}

/// Get the application data directory (~/MedAI/).
///
/// `None` when the platform exposes no home directory.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

/// Location of the on-disk key-value database.
pub fn storage_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("medai.db"))
}

/// Listen address from `MEDAI_BIND_ADDR`, or `DEFAULT_BIND_ADDR`.
pub fn bind_addr() -> Result<SocketAddr, AddrParseError> {
    std::env::var(BIND_ADDR_ENV)
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into())
        .parse()
}

/// REST client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Total attempts for idempotent GET requests (first try included).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every following retry.
    pub retry_base_delay: Duration,
}

impl ClientConfig {
    /// Build from the environment, falling back to the local development backend.
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.into());
        Self::with_base_url(&base_url)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

/// Simulated network latency per store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub list: Duration,
    pub get: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl LatencyProfile {
    /// No delay at all. Used by tests and the REST router.
    pub const fn none() -> Self {
        Self {
            list: Duration::ZERO,
            get: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(250),
            get: Duration::from_millis(200),
            create: Duration::from_millis(500),
            update: Duration::from_millis(500),
            delete: Duration::from_millis(300),
        }
    }
}

/// What happens to persisted collections when a store is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Clear both collections and write the seed (demo behavior).
    #[default]
    Reset,
    /// Write the seed only for keys that are absent.
    IfAbsent,
    /// Leave storage untouched; absent keys read as the seed.
    Never,
}

/// Mock store tuning.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub latency: LatencyProfile,
    /// Upper bound on a single operation, latency included.
    pub timeout: Option<Duration>,
    pub seed_policy: SeedPolicy,
    /// Owner stamped on records created without an explicit doctor.
    pub default_doctor_id: i64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            latency: LatencyProfile::default(),
            timeout: None,
            seed_policy: SeedPolicy::Reset,
            default_doctor_id: 1,
        }
    }
}

impl StoreOptions {
    /// Zero latency, no timeout, reset on open, doctor 1.
    pub fn instant() -> Self {
        Self {
            latency: LatencyProfile::none(),
            ..Self::default()
        }
    }
}

/// Delays applied by the mock authentication service.
#[derive(Debug, Clone, Copy)]
pub struct AuthLatency {
    pub login: Duration,
    pub register: Duration,
}

impl AuthLatency {
    pub const fn none() -> Self {
        Self {
            login: Duration::ZERO,
            register: Duration::ZERO,
        }
    }
}

impl Default for AuthLatency {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(500),
            register: Duration::from_millis(800),
        }
    }
}
