use std::env;
use tracing::warn;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub supabase_jwt_secret: String,
    pub bind_address: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            bind_address: env::var("CLINIC_BIND_ADDRESS")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_BIND_ADDRESS not set, using default");
                    DEFAULT_BIND_ADDRESS.to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Supabase not fully configured - appointment data will be kept in memory");
        }

        config
    }

    /// True when the PostgREST-backed store can be used.
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_auth_configured(&self) -> bool {
        !self.supabase_jwt_secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, key: &str) -> AppConfig {
        AppConfig {
            supabase_url: url.to_string(),
            supabase_service_key: key.to_string(),
            supabase_jwt_secret: String::new(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }

    #[test]
    fn store_requires_url_and_key() {
        assert!(config("http://localhost:54321", "key").is_configured());
        assert!(!config("", "key").is_configured());
        assert!(!config("http://localhost:54321", "").is_configured());
    }

    #[test]
    fn auth_requires_secret() {
        let mut cfg = config("", "");
        assert!(!cfg.is_auth_configured());
        cfg.supabase_jwt_secret = "secret".to_string();
        assert!(cfg.is_auth_configured());
    }
}
