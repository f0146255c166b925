//! HS256 token signing and verification.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use stockroom_core::UserId;

use crate::{JwtClaims, Role, TokenError, validate_claims};

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Shared-secret HS256 signer/validator.
///
/// Expiry lives in our own `issued_at`/`expires_at` claims and is checked by
/// [`validate_claims`], so the registered `exp` claim is not required.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign an arbitrary claims set.
    pub fn encode(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a token for a user, valid from `now` for the configured lifetime.
    pub fn issue(
        &self,
        user_id: UserId,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::InvalidTimeWindow)?;
        self.encode(&JwtClaims {
            sub: user_id,
            username: username.to_string(),
            role,
            issued_at: now,
            expires_at,
        })
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str) -> Hs256Jwt {
        Hs256Jwt::new(secret, Duration::hours(24))
    }

    #[test]
    fn issued_tokens_validate() {
        let signer = jwt("test-secret");
        let now = Utc::now();
        let user_id = UserId::new();

        let token = signer.issue(user_id, "alice", Role::Manager, now).unwrap();
        let claims = signer.validate(&token, now).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.expires_at, now + Duration::hours(24));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let signer = Hs256Jwt::new("test-secret", Duration::try_days(1_000_000_000).unwrap());
        assert!(matches!(
            signer.issue(UserId::new(), "carol", Role::Employee, Utc::now()),
            Err(TokenError::InvalidTimeWindow)
        ));
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let now = Utc::now();
        let token = jwt("one").issue(UserId::new(), "bob", Role::Employee, now).unwrap();
        assert!(matches!(
            jwt("two").validate(&token, now),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            jwt("one").validate("not.a.token", now),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let signer = jwt("test-secret");
        let then = Utc::now() - Duration::days(2);
        let token = signer.issue(UserId::new(), "carol", Role::Admin, then).unwrap();
        assert_eq!(signer.validate(&token, Utc::now()), Err(TokenError::Expired));
    }
}
