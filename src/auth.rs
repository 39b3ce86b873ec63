//! Mock authentication over the key-value store.
//!
//! Accounts live under `users`; the signed-in account and its bearer token
//! under `user` and `token`. Passwords are not checked: any known email signs
//! in. Every issued token is also kept in an in-memory session table so the
//! REST router can resolve concurrent callers. Each account holds at most one
//! live token: signing in again revokes the previous one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::sync::{Mutex, RwLock};

use crate::config::AuthLatency;
use crate::db::{self, keys, KeyValueStorage};
use crate::models::{AuthResponse, RegisterData, User, UserUpdate};
use crate::store::StoreError;

/// Prefix of every demo token.
pub const TOKEN_PREFIX: &str = "demo_token_";

const TOKEN_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Email of the account created when no users exist.
pub const DEMO_EMAIL: &str = "doctor1@medai.com";

/// `demo_token_` followed by nine random base-36 characters.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..TOKEN_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{TOKEN_PREFIX}{suffix}")
}

fn demo_user() -> User {
    User {
        id: 1,
        email: DEMO_EMAIL.into(),
        full_name: "Доктор Иванов Иван Иванович".into(),
        specialty: "Терапевт".into(),
        workplace: "Городская больница №1".into(),
        medical_license: "МЛ-123456".into(),
        phone: "+7 (999) 123-45-67".into(),
        is_active: true,
        is_verified: true,
        created_at: Utc::now(),
    }
}

/// A freshly issued credential together with its account.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: AuthResponse,
    pub user: User,
}

pub struct AuthService {
    storage: Arc<dyn KeyValueStorage>,
    latency: AuthLatency,
    sessions: RwLock<HashMap<String, i64>>,
    /// Serializes read-modify-write of the accounts list.
    write_lock: Mutex<()>,
}

impl AuthService {
    /// Open over `storage`, seeding the demo account if no users exist.
    pub fn new(storage: Arc<dyn KeyValueStorage>, latency: AuthLatency) -> Result<Self, StoreError> {
        let service = Self {
            storage,
            latency,
            sessions: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        };

        if service.users()?.is_empty() {
            db::write_json(service.storage.as_ref(), keys::USERS, &[demo_user()])?;
            tracing::info!(email = DEMO_EMAIL, "Seeded demo account");
        }
        Ok(service)
    }

    /// All registered accounts.
    pub fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(db::read_json(self.storage.as_ref(), keys::USERS)?.unwrap_or_default())
    }

    pub async fn login(&self, email: &str, _password: &str) -> Result<AuthSession, StoreError> {
        pause(self.latency.login).await;

        let user = self
            .users()?
            .into_iter()
            .find(|u| u.email == email)
            .ok_or_else(|| {
                tracing::warn!(email, "Login for unknown account");
                StoreError::UserNotFound {
                    email: email.to_string(),
                }
            })?;

        let session = self.start_session(user).await?;
        tracing::info!(user_id = session.user.id, "Signed in");
        Ok(session)
    }

    /// Create an account and sign it in.
    pub async fn register(&self, data: RegisterData) -> Result<AuthSession, StoreError> {
        pause(self.latency.register).await;

        if data.email.trim().is_empty() {
            return Err(StoreError::invalid("email", "must not be blank"));
        }

        let guard = self.write_lock.lock().await;
        let mut users = self.users()?;
        if users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict(format!(
                "an account for {} already exists",
                data.email
            )));
        }

        let now = Utc::now();
        let max_existing = users.iter().map(|u| u.id).max().unwrap_or(0);
        let user = User {
            id: now.timestamp_millis().max(max_existing + 1),
            email: data.email,
            full_name: data.full_name.unwrap_or_default(),
            specialty: data.specialty.unwrap_or_default(),
            workplace: data.workplace.unwrap_or_default(),
            medical_license: data.medical_license.unwrap_or_default(),
            phone: data.phone.unwrap_or_default(),
            is_active: true,
            is_verified: true,
            created_at: now,
        };
        users.push(user.clone());
        db::write_json(self.storage.as_ref(), keys::USERS, &users)?;
        drop(guard);
        tracing::info!(user_id = user.id, "Registered account");

        self.start_session(user).await
    }

    /// Forget the signed-in account.
    pub async fn logout(&self) -> Result<(), StoreError> {
        if let Some(token) = self.storage.get_item(keys::TOKEN)? {
            self.sessions.write().await.remove(&token);
        }
        self.storage.remove_item(keys::TOKEN)?;
        self.storage.remove_item(keys::USER)?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// The signed-in account, when both the token and the user are stored.
    ///
    /// An undecodable stored user is treated as no session and cleared.
    pub fn current_user(&self) -> Result<Option<User>, StoreError> {
        if self.storage.get_item(keys::TOKEN)?.is_none() {
            return Ok(None);
        }
        match db::read_json::<User>(self.storage.as_ref(), keys::USER) {
            Ok(user) => Ok(user),
            Err(err) => {
                tracing::warn!(error = %err, "Stored session is corrupted, clearing it");
                self.storage.remove_item(keys::USER)?;
                self.storage.remove_item(keys::TOKEN)?;
                Ok(None)
            }
        }
    }

    /// Merge `update` into the signed-in account and the accounts list.
    ///
    /// `Ok(None)` when nobody is signed in.
    pub async fn update_user(&self, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut user) = self.current_user()? else {
            return Ok(None);
        };
        update.apply_to(&mut user);
        db::write_json(self.storage.as_ref(), keys::USER, &user)?;

        let mut users = self.users()?;
        for existing in users.iter_mut().filter(|u| u.id == user.id) {
            *existing = user.clone();
        }
        db::write_json(self.storage.as_ref(), keys::USERS, &users)?;
        Ok(Some(user))
    }

    /// Resolve a bearer token issued by this service.
    pub async fn user_for_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let Some(user_id) = self.sessions.read().await.get(token).copied() else {
            return Ok(None);
        };
        Ok(self.users()?.into_iter().find(|u| u.id == user_id))
    }

    async fn start_session(&self, user: User) -> Result<AuthSession, StoreError> {
        let token = generate_token();
        self.storage.set_item(keys::TOKEN, &token)?;
        db::write_json(self.storage.as_ref(), keys::USER, &user)?;
        {
            let mut sessions = self.sessions.write().await;
            sessions.retain(|_, id| *id != user.id);
            sessions.insert(token.clone(), user.id);
        }

        Ok(AuthSession {
            token: AuthResponse {
                access_token: token,
                token_type: "bearer".into(),
            },
            user,
        })
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
