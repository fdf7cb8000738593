//! HS256 bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};
use crate::Actor;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or unsigned token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// A freshly signed token together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Symmetric-key (HS256) token issuer and validator.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, actor: Actor, now: DateTime<Utc>, ttl: Duration) -> Result<IssuedToken, TokenError> {
        let claims = JwtClaims::for_actor(actor, now, ttl);
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at,
        })
    }
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt").finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use commissary_core::UserId;

    #[test]
    fn issued_token_validates_back_to_the_same_actor() {
        let jwt = Hs256Jwt::new("test-secret");
        let actor = Actor::new(UserId::new(), Role::Admin);
        let now = Utc::now();

        let issued = jwt.issue(actor, now, Duration::minutes(30)).unwrap();
        let claims = jwt.validate(&issued.token, now + Duration::minutes(1)).unwrap();

        assert_eq!(claims.actor(), actor);
        assert_eq!(issued.expires_at.timestamp(), claims.expires_at.timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let actor = Actor::new(UserId::new(), Role::Staff);
        let now = Utc::now();
        let issued = Hs256Jwt::new("secret-a").issue(actor, now, Duration::minutes(5)).unwrap();

        let err = Hs256Jwt::new("secret-b").validate(&issued.token, now).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = Hs256Jwt::new("test-secret");
        let actor = Actor::new(UserId::new(), Role::Trustee);
        let now = Utc::now();
        let issued = jwt.issue(actor, now, Duration::minutes(5)).unwrap();

        let err = jwt.validate(&issued.token, now + Duration::minutes(6)).unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::Expired));
    }

    #[test]
    fn garbage_is_rejected() {
        let jwt = Hs256Jwt::new("test-secret");
        assert!(matches!(
            jwt.validate("not.a.token", Utc::now()),
            Err(TokenError::Invalid(_))
        ));
    }
}
