//! Session token issuance and authentication.
//!
//! Mints HS256-signed JWTs binding a user id, with a configured expiry and
//! a process-wide signing secret. Issuing is a pure function of
//! `(user id, secret, expiry, now)`; the clock is always passed in so
//! expiry behavior is testable without sleeping.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime in days.
pub const DEFAULT_TOKEN_EXPIRY_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    // ---
    alg: String,
    typ: String,
}

impl TokenHeader {
    // ---
    fn hs256() -> Self {
        // ---
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenClaims {
    // ---
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// Reasons a token fails to authenticate. Callers collapse all of these
/// into a single unauthorized outcome; the variants exist for logging.
#[derive(Debug, Error)]
pub enum TokenError {
    // ---
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("signing key rejected")]
    Key,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    // ---
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    // ---
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Issues and authenticates signed session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    // ---
    secret: Vec<u8>,
    expiry: Duration,
}

impl SessionIssuer {
    // ---
    pub fn new(secret: impl Into<Vec<u8>>, expiry: Duration) -> Self {
        // ---
        Self {
            secret: secret.into(),
            expiry,
        }
    }

    /// Create an HS256 session token for `user_id`, valid from `now` until
    /// `now + expiry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the header/claims cannot be encoded or the
    /// signing key is rejected. Both are fatal to the request.
    pub fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        // ---
        let claims = TokenClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };

        let header_b64 = b64e_json(&TokenHeader::hs256())?;
        let claims_b64 = b64e_json(&claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Key)?;
        mac.update(signing_input.as_bytes());
        let signature_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify a session token and return the user id it binds.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the token is malformed or contains invalid base64/json,
    /// - the algorithm is not HS256,
    /// - the signature does not verify,
    /// - the token is expired as of `now`.
    pub fn authenticate(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        // ---
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
        let claims_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
        let sig_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
        if parts.next().is_some() {
            return Err(TokenError::TokenFormat);
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlg(header.alg));
        }

        // Signature first; claims are untrusted until it checks out.
        let signing_input = format!("{header_b64}.{claims_b64}");
        let signature =
            Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| TokenError::Base64)?;

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Key)?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: TokenClaims = b64d_json(claims_b64)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn issuer() -> SessionIssuer {
        // ---
        SessionIssuer::new(b"test-signing-secret".to_vec(), Duration::days(30))
    }

    #[test]
    fn issued_token_authenticates_back_to_the_same_user() {
        // ---
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let token = issuer.issue(user_id, now).unwrap();
        let decoded = issuer.authenticate(&token, now).unwrap();

        assert_eq!(decoded, user_id);
    }

    #[test]
    fn token_expires_under_an_injected_clock() {
        // ---
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let issued_at = Utc::now();

        let token = issuer.issue(user_id, issued_at).unwrap();

        // Just before expiry: still good.
        let almost = issued_at + Duration::days(30) - Duration::seconds(1);
        assert!(issuer.authenticate(&token, almost).is_ok());

        // At and after expiry: rejected.
        let expired = issued_at + Duration::days(30);
        assert!(matches!(
            issuer.authenticate(&token, expired),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn tampered_claims_are_rejected() {
        // ---
        let issuer = issuer();
        let now = Utc::now();
        let token = issuer.issue(Uuid::new_v4(), now).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = b64e_json(&TokenClaims {
            sub: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + Duration::days(365)).timestamp(),
        })
        .unwrap();
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        assert!(matches!(
            issuer.authenticate(&forged, now),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        // ---
        let now = Utc::now();
        let token = issuer().issue(Uuid::new_v4(), now).unwrap();

        let other = SessionIssuer::new(b"another-secret".to_vec(), Duration::days(30));
        assert!(matches!(
            other.authenticate(&token, now),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_tokens_are_rejected_uniformly() {
        // ---
        let issuer = issuer();
        let now = Utc::now();

        assert!(issuer.authenticate("", now).is_err());
        assert!(issuer.authenticate("a.b", now).is_err());
        assert!(issuer.authenticate("a.b.c.d", now).is_err());
        assert!(issuer.authenticate("not@base64.!!!", now).is_err());
    }
}
