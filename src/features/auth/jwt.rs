use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::auth::model::{AuthenticatedUser, Role};

/// Claims carried by tokens from the identity provider.
///
/// Tokens are issued elsewhere (login/session handling is not this service's
/// concern); we only verify the shared-secret signature and expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
}

pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway.as_secs();

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        let claims = token_data.claims;

        Ok(AuthenticatedUser {
            id: claims.sub,
            name: claims.name,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-which-is-long-enough!!";

    fn issue(claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn test_valid_token_roundtrip() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        let id = Uuid::new_v4();
        let token = issue(&Claims {
            sub: id,
            name: "Staf Tata Usaha".to_string(),
            role: Role::Staff,
            iat: now(),
            exp: now() + 3600,
        });

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Staff);
        assert_eq!(user.name, "Staf Tata Usaha");
    }

    #[test]
    fn test_expired_token_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        let token = issue(&Claims {
            sub: Uuid::new_v4(),
            name: "Administrator".to_string(),
            role: Role::Admin,
            iat: now() - 7200,
            exp: now() - 3600,
        });

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let validator = JwtValidator::new("another-secret-which-is-also-long", Duration::from_secs(0));
        let token = issue(&Claims {
            sub: Uuid::new_v4(),
            name: "Administrator".to_string(),
            role: Role::Admin,
            iat: now(),
            exp: now() + 3600,
        });

        assert!(validator.validate_token(&token).is_err());
    }
}
