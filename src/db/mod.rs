pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::*;

use thiserror::Error;

/// Fixed keys of the persisted collections and session state.
pub mod keys {
    pub const PATIENTS: &str = "patients";
    pub const PRESCRIPTIONS: &str = "prescriptions";
    pub const USERS: &str = "users";
    /// The signed-in user, as JSON.
    pub const USER: &str = "user";
    /// Bearer token of the signed-in user.
    pub const TOKEN: &str = "token";
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error under key {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// String-keyed persistent storage, shaped like the browser's localStorage.
///
/// Implementations own their interior mutability so a single instance can be
/// shared behind an `Arc`.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), DatabaseError>;

    fn remove_item(&self, key: &str) -> Result<(), DatabaseError>;
}

/// Read and decode a JSON value stored under `key`.
pub fn read_json<T: serde::de::DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> Result<Option<T>, DatabaseError> {
    match storage.get_item(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| DatabaseError::Json {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
pub fn write_json<T: serde::Serialize + ?Sized>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), DatabaseError> {
    let raw = serde_json::to_string(value).map_err(|source| DatabaseError::Json {
        key: key.to_string(),
        source,
    })?;
    storage.set_item(key, &raw)
}
