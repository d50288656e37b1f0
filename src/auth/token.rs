use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::AuthError;
use crate::clock::Clock;

/// Tokens are valid for a fixed 24 hours after issuance
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HS256 identity tokens against one process-wide secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        // Expiry is checked against our own clock, not the system time
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        })
    }

    pub fn issue(&self, subject: Uuid) -> Result<IssuedToken, AuthError> {
        let now = self.clock.now();
        let expires_at = now + Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return its subject.
    ///
    /// Every failure collapses into `AuthError::InvalidToken`; the reason is
    /// only logged.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AuthError::InvalidToken
        })?;
        let claims = data.claims;

        let now = self.clock.now().timestamp();
        if now >= claims.exp {
            tracing::debug!(
                "Token rejected: expired at {}",
                Utc.timestamp_opt(claims.exp, 0)
                    .single()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| claims.exp.to_string())
            );
            return Err(AuthError::InvalidToken);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| {
            tracing::debug!("Token rejected: subject is not a UUID");
            AuthError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn service(clock: Arc<FixedClock>) -> TokenService {
        TokenService::new("unit-test-secret", clock).unwrap()
    }

    fn replace_char(s: &str, index: usize) -> String {
        s.char_indices()
            .map(|(i, c)| if i == index { if c == 'A' { 'B' } else { 'A' } } else { c })
            .collect()
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let clock = Arc::new(FixedClock::new(start()));
        let tokens = service(clock);
        let subject = Uuid::new_v4();

        let issued = tokens.issue(subject).unwrap();
        assert_eq!(issued.expires_at, start() + Duration::hours(24));
        assert_eq!(tokens.verify(&issued.token).unwrap(), subject);
    }

    #[test]
    fn token_expires_after_24_hours() {
        let clock = Arc::new(FixedClock::new(start()));
        let tokens = service(clock.clone());
        let issued = tokens.issue(Uuid::new_v4()).unwrap();

        clock.advance(Duration::hours(24) - Duration::seconds(1));
        assert!(tokens.verify(&issued.token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(tokens.verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let tokens = service(Arc::new(FixedClock::new(start())));
        let issued = tokens.issue(Uuid::new_v4()).unwrap();

        let signature_start = issued.token.rfind('.').unwrap() + 1;
        let tampered = replace_char(&issued.token, signature_start + 5);
        assert_ne!(tampered, issued.token);
        assert!(matches!(tokens.verify(&tampered), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let tokens = service(Arc::new(FixedClock::new(start())));
        let issued = tokens.issue(Uuid::new_v4()).unwrap();

        let payload_start = issued.token.find('.').unwrap() + 1;
        let tampered = replace_char(&issued.token, payload_start + 10);
        assert!(matches!(tokens.verify(&tampered), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let clock = Arc::new(FixedClock::new(start()));
        let ours = service(clock.clone());
        let theirs = TokenService::new("some-other-secret", clock).unwrap();

        let issued = theirs.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(ours.verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn wrong_algorithm_is_invalid() {
        let clock = Arc::new(FixedClock::new(start()));
        let tokens = service(clock);
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: start().timestamp(),
            exp: (start() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn non_uuid_subject_is_invalid() {
        let tokens = service(Arc::new(FixedClock::new(start())));
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iat: start().timestamp(),
            exp: (start() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_is_invalid() {
        let tokens = service(Arc::new(FixedClock::new(start())));
        for garbage in ["", "abc", "a.b.c", "....."] {
            assert!(matches!(tokens.verify(garbage), Err(AuthError::InvalidToken)));
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        let result = TokenService::new("", Arc::new(FixedClock::new(start())));
        assert!(matches!(result, Err(AuthError::MissingSecret)));
    }
}
