use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use shared_config::AppConfig;
use shared_database::{ClinicStore, MemoryStore};
use shared_models::auth::{Role, User};
use shared_models::clinic::{NewDoctor, NewPatient};

use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            bind_address: "127.0.0.1:0".to_string(),
        }
    }

    /// Router state backed by the given in-memory store.
    pub fn to_state(&self, memory: Arc<MemoryStore>) -> Arc<AppState> {
        Arc::new(AppState::new(self.to_app_config(), ClinicStore::from_memory(memory)))
    }
}

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl TestUser {
    pub fn new(id: i64, email: &str, role: Role) -> Self {
        Self {
            id,
            email: email.to_string(),
            role,
        }
    }

    pub fn doctor(id: i64) -> Self {
        Self::new(id, "doctor@clinic.test", Role::Doctor)
    }

    pub fn patient(id: i64) -> Self {
        Self::new(id, "patient@example.com", Role::Patient)
    }

    pub fn admin(id: i64) -> Self {
        Self::new(id, "admin@clinic.test", Role::Admin)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.to_string(),
            email: Some(self.email.clone()),
            role: self.role,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    fn sign(payload: serde_json::Value, secret: &str) -> String {
        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        Self::sign(
            json!({
                "sub": user.id.to_string(),
                "email": user.email,
                "role": user.role.to_string(),
                "iat": now.timestamp(),
                "exp": exp.timestamp()
            }),
            secret,
        )
    }

    pub fn create_token_with_role(sub: &str, role: &str, secret: &str) -> String {
        let now = Utc::now();
        Self::sign(
            json!({
                "sub": sub,
                "role": role,
                "iat": now.timestamp(),
                "exp": (now + Duration::hours(1)).timestamp()
            }),
            secret,
        )
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned clinic records for tests.
pub struct ClinicFixtures;

impl ClinicFixtures {
    pub fn doctor(name: &str, specialty: &str, times: &[&str]) -> NewDoctor {
        let local = name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>();
        NewDoctor {
            name: name.to_string(),
            specialty: specialty.to_string(),
            email: format!("{}@clinic.test", local),
            phone: Some("555-0199".to_string()),
            available_times: times.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn patient(name: &str) -> NewPatient {
        let local = name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>();
        NewPatient {
            name: name.to_string(),
            email: format!("{}@example.com", local),
            phone: "555-0100".to_string(),
            address: "12 Harbour Road".to_string(),
        }
    }

    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 5, 20).expect("valid fixture date")
    }

    pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
        Self::date()
            .and_hms_opt(hour, minute, 0)
            .expect("valid fixture time")
    }
}
