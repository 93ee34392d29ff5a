use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{JwtClaims, JwtHeader, Role, User};

type HmacSha256 = Hmac<Sha256>;

/// Validates an HS256 token and returns the clinic user it identifies.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }
    let (header_b64, claims_b64, signature_b64) = (parts[0], parts[1], parts[2]);

    let header: JwtHeader = decode_segment(header_b64)
        .map_err(|_| "Invalid token header".to_string())?;
    if header.alg != "HS256" {
        debug!("Rejected token signed with {}", header.alg);
        return Err("Unsupported token algorithm".to_string());
    }

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        "Invalid signature encoding".to_string()
    })?;

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims: JwtClaims = decode_segment(claims_b64).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        "Invalid claims format".to_string()
    })?;

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let role: Role = claims
        .role
        .as_deref()
        .ok_or_else(|| "Token carries no role".to_string())?
        .parse()?;

    let created_at = claims
        .iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        id: claims.sub,
        email: claims.email,
        role,
        created_at,
    };

    debug!("Token validated for {} {}", user.role, user.id);
    Ok(user)
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, String> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| e.to_string())?;
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn accepts_valid_token() {
        let patient = TestUser::patient(7);
        let token = JwtTestUtils::create_test_token(&patient, SECRET, None);

        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.role, Role::Patient);
        assert_eq!(user.record_id(), Some(7));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = JwtTestUtils::create_invalid_signature_token(&TestUser::admin(1));
        assert_eq!(validate_token(&token, SECRET), Err("Invalid token signature".to_string()));
    }

    #[test]
    fn rejects_expired_token() {
        let token = JwtTestUtils::create_expired_token(&TestUser::doctor(2), SECRET);
        assert_eq!(validate_token(&token, SECRET), Err("Token expired".to_string()));
    }

    #[test]
    fn rejects_malformed_token() {
        let result = validate_token(&JwtTestUtils::create_malformed_token(), SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_role() {
        let token = JwtTestUtils::create_token_with_role("5", "nurse", SECRET);
        assert!(validate_token(&token, SECRET).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let token = JwtTestUtils::create_test_token(&TestUser::patient(1), SECRET, None);
        assert_eq!(validate_token(&token, ""), Err("JWT secret is not set".to_string()));
    }
}
