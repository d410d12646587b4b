//! JWT token management
//!
//! Validates bearer tokens issued by the site's identity provider.

use crate::auth::Role;
use crate::error::AppError;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Display name
    pub name: String,
    /// User role
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Decode and validate a JWT token
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".to_string())
        }
        jsonwebtoken::errors::ErrorKind::InvalidToken => {
            AppError::Unauthorized("Invalid token".to_string())
        }
        _ => AppError::Unauthorized(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Issue a one-hour token, as the identity provider does
#[cfg(test)]
pub fn create_token(
    secret: &str,
    user_id: Uuid,
    name: &str,
    role: Role,
) -> Result<String, jsonwebtoken::errors::Error> {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        name: name.to_string(),
        role,
        exp: (now + Duration::minutes(60)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_carries_role() {
        let user = Uuid::new_v4();
        let token = create_token("secret", user, "admin", Role::Owner).unwrap();
        let claims = decode_token("secret", &token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.role, Role::Owner);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token("secret", Uuid::new_v4(), "admin", Role::Owner).unwrap();
        let result = decode_token("other", &token);

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
