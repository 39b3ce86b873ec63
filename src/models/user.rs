use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A physician account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub workplace: String,
    #[serde(default)]
    pub medical_license: String,
    #[serde(default)]
    pub phone: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub specialty: Option<String>,
    pub workplace: Option<String>,
    pub medical_license: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Profile edit for the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub specialty: Option<String>,
    pub workplace: Option<String>,
    pub medical_license: Option<String>,
    pub phone: Option<String>,
}

impl UserUpdate {
    pub fn apply_to(self, user: &mut User) {
        let fields = [
            (self.full_name, &mut user.full_name),
            (self.specialty, &mut user.specialty),
            (self.workplace, &mut user.workplace),
            (self.medical_license, &mut user.medical_license),
            (self.phone, &mut user.phone),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}
