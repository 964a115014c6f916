use crate::types::Claims;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

/// Default token lifetime: 30 days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Longest lifetime accepted from configuration: 10 years.
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Why a token was refused (or could not be produced).
///
/// The verification kinds are for logs and tests only; clients always see a
/// plain 401.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("token lifetime out of range")]
    TtlOutOfRange,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Issues and verifies HS256 bearer tokens.
///
/// Tokens carry only the principal id plus `iat`/`exp`; callers resolve the
/// live account record themselves so profile data is never stale.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    /// Creates a new TokenService.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be at least 32 bytes)
    /// * `default_ttl` - Lifetime used by [`issue_default`](Self::issue_default)
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by hand so that `exp == now` is already expired
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Signs a token for `principal_id` that expires `ttl` from now.
    pub fn issue(&self, principal_id: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenError::TtlOutOfRange)?;
        let claims = Claims {
            sub: principal_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Signs a token with the configured default lifetime.
    pub fn issue_default(&self, principal_id: &str) -> Result<String, TokenError> {
        self.issue(principal_id, self.default_ttl)
    }

    /// Verifies signature then expiry, returning the full claims.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Verifies a token and returns the principal id it was issued for.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> TokenService {
        TokenService::new(
            "test-secret-key-that-is-at-least-32-chars",
            Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        )
    }

    /// Replaces one character of the payload segment with a different
    /// base64url character.
    fn tamper_payload(token: &str, index: usize) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut payload: Vec<char> = parts[1].chars().collect();
        let i = index % payload.len();
        payload[i] = if payload[i] == 'A' { 'B' } else { 'A' };
        parts[1] = payload.into_iter().collect();
        parts.join(".")
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_test_service();

        let token = service
            .issue("user-123", Duration::minutes(5))
            .expect("should issue token");

        assert_eq!(token.split('.').count(), 3, "token should be a compact JWT");
        assert_eq!(service.verify(&token).expect("should verify"), "user-123");
    }

    #[test]
    fn test_issue_default_ttl() {
        let service = create_test_service();

        assert_eq!(
            service.default_ttl(),
            Duration::seconds(DEFAULT_TOKEN_TTL_SECS)
        );

        let token = service.issue_default("user-1").expect("should issue");
        let claims = service.decode_claims(&token).expect("should verify");

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);

        let now = Utc::now().timestamp();
        assert!(claims.iat <= now && claims.iat >= now - 5);
    }

    #[test]
    fn test_maximum_ttl_round_trips() {
        let service = create_test_service();

        let token = service
            .issue("user-1", Duration::seconds(MAX_TOKEN_TTL_SECS))
            .expect("should issue");

        assert_eq!(service.verify(&token).expect("should verify"), "user-1");
    }

    #[test]
    fn test_unrepresentable_ttl_is_error() {
        let service = create_test_service();

        assert_eq!(
            service.issue("user-1", Duration::days(365 * 1_000_000)),
            Err(TokenError::TtlOutOfRange)
        );
        assert_eq!(
            service.issue("user-1", Duration::MAX),
            Err(TokenError::TtlOutOfRange)
        );
    }

    #[test]
    fn test_expired_token() {
        let service = create_test_service();

        let token = service
            .issue("user-1", Duration::seconds(-10))
            .expect("should issue");

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_zero_ttl_is_already_expired() {
        let service = create_test_service();

        let token = service.issue("user-1", Duration::zero()).expect("should issue");

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[tokio::test]
    async fn test_token_expires_after_ttl() {
        let service = create_test_service();

        let token = service
            .issue("user-1", Duration::seconds(1))
            .expect("should issue");
        assert!(service.verify(&token).is_ok());

        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_payload_is_signature_error() {
        let service = create_test_service();
        let token = service
            .issue("user-1", Duration::hours(1))
            .expect("should issue");

        let payload_len = token.split('.').nth(1).unwrap().len();
        for index in 0..payload_len {
            let tampered = tamper_payload(&token, index);
            assert_eq!(
                service.verify(&tampered),
                Err(TokenError::InvalidSignature),
                "tampering payload char {} should break the signature",
                index
            );
        }
    }

    #[test]
    fn test_tampered_expired_token_reports_signature() {
        let service = create_test_service();
        let token = service
            .issue("user-1", Duration::seconds(-60))
            .expect("should issue");

        let tampered = tamper_payload(&token, 3);

        assert_eq!(service.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = TokenService::new("secret-one-that-is-32-chars-long", Duration::hours(1));
        let service2 = TokenService::new("secret-two-that-is-32-chars-long", Duration::hours(1));

        let token = service1.issue_default("user-789").expect("should issue");

        assert_eq!(service2.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_malformed_token() {
        let service = create_test_service();

        assert!(matches!(
            service.verify("invalid.token.here"),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(service.verify(""), Err(TokenError::Malformed(_))));
        assert!(matches!(
            service.verify("no-dots-at-all"),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_tokens_for_same_principal_both_verify() {
        let service = create_test_service();

        let first = service.issue("user-42", Duration::hours(1)).unwrap();
        let second = service.issue("user-42", Duration::hours(2)).unwrap();

        assert_ne!(first, second);
        assert_eq!(service.verify(&first).unwrap(), "user-42");
        assert_eq!(service.verify(&second).unwrap(), "user-42");
    }
}
