//! Bearer-token issue and validation.
//!
//! Tokens are HS256 JWTs carrying the user's id, display name, email and
//! role. Validation checks signature, issuer, audience and expiry; every
//! failure collapses to [`AppError::Unauthorized`] so callers cannot probe
//! which check rejected the token.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::{AppError, AppResult};

/// Claims embedded in a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role name (`Visitor`, `Owner` or `Admin`).
    pub role: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Expiry (seconds since the epoch).
    pub exp: i64,
}

/// Resolve the signing secret into raw key bytes.
///
/// A `base64:` prefix marks a base64-encoded key; anything else is used as
/// raw UTF-8 bytes.
fn resolve_secret(secret: &str) -> AppResult<Vec<u8>> {
    if let Some(encoded) = secret
        .strip_prefix("base64:")
        .or_else(|| secret.strip_prefix("BASE64:"))
    {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| AppError::Config(format!("Invalid base64 signing secret: {e}")))
    } else {
        Ok(secret.as_bytes().to_vec())
    }
}

/// Issue a signed, time-limited bearer token for a user.
pub fn issue_token(
    auth: &AuthConfig,
    user_id: &str,
    name: &str,
    email: &str,
    role: &str,
) -> AppResult<String> {
    let key = resolve_secret(&auth.secret)?;
    let expires_at = Utc::now() + Duration::hours(auth.token_ttl_hours);

    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        iss: auth.issuer.clone(),
        aud: auth.audience.clone(),
        exp: expires_at.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&key),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
}

/// Validate a bearer token and return its claims.
///
/// Signature, issuer, audience and expiry are all checked; any failure is
/// reported uniformly as [`AppError::Unauthorized`].
pub fn validate_token(auth: &AuthConfig, token: &str) -> AppResult<Claims> {
    let key = resolve_secret(&auth.secret)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&auth.issuer]);
    validation.set_audience(&[&auth.audience]);
    validation.set_required_spec_claims(&["exp", "iss", "aud"]);

    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&key), &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            secret: "a-test-secret-of-reasonable-length".to_string(),
            issuer: "templatehub".to_string(),
            audience: "templatehub".to_string(),
            token_ttl_hours: 2,
        }
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let auth = test_auth_config();
        let token = issue_token(&auth, "user1", "Test User", "test@example.com", "Owner").unwrap();

        let claims = validate_token(&auth, &token).unwrap();
        assert_eq!(claims.sub, "user1");
        assert_eq!(claims.name, "Test User");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, "Owner");
        assert_eq!(claims.iss, "templatehub");
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut auth = test_auth_config();
        auth.token_ttl_hours = -1;

        let token = issue_token(&auth, "user1", "Test User", "test@example.com", "Visitor")
            .unwrap();

        assert!(matches!(
            validate_token(&auth, &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let auth = test_auth_config();
        let token = issue_token(&auth, "user1", "Test User", "test@example.com", "Visitor")
            .unwrap();

        let mut other = test_auth_config();
        other.audience = "someone-else".to_string();

        assert!(matches!(
            validate_token(&other, &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = test_auth_config();
        let token = issue_token(&auth, "user1", "Test User", "test@example.com", "Visitor")
            .unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('a') { 'b' } else { 'a' });

        assert!(matches!(
            validate_token(&auth, &tampered),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_base64_prefixed_secret() {
        use base64::Engine as _;

        let raw = b"another-test-secret";
        let mut auth = test_auth_config();
        auth.secret = format!(
            "base64:{}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        );

        let token = issue_token(&auth, "user1", "Test User", "test@example.com", "Visitor")
            .unwrap();
        let claims = validate_token(&auth, &token).unwrap();
        assert_eq!(claims.sub, "user1");
    }
}
