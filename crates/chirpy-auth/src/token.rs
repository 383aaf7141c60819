use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthError, AuthResult};

/// Issuer label stamped into every token and required on validation.
pub const TOKEN_ISSUER: &str = "chirpy";

/// Registered claims carried by an identity token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, always [`TOKEN_ISSUER`].
    pub iss: String,
    /// Subject: the user id in decimal.
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Issue an HS256 token for `user_id` valid for `lifetime` from now.
///
/// The clock is sampled on every call, so two calls produce distinct
/// tokens that are each independently valid.
pub fn issue_token(user_id: u64, secret: &[u8], lifetime: Duration) -> AuthResult<String> {
    issue_token_at(user_id, secret, Utc::now(), lifetime)
}

/// Issue a token as if the current time were `issued_at`.
pub fn issue_token_at(
    user_id: u64,
    secret: &[u8],
    issued_at: DateTime<Utc>,
    lifetime: Duration,
) -> AuthResult<String> {
    let iat = issued_at.timestamp();
    let lifetime = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);
    let claims = Claims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat,
        exp: iat.saturating_add(lifetime),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verify a token's signature, issuer and expiry, and return its user id.
///
/// There is no leeway: a token is rejected as soon as the verifier's clock
/// passes `exp`.
pub fn validate_token(token: &str, secret: &[u8]) -> AuthResult<u64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| {
            debug!(reason = ?e.kind(), "token rejected");
            AuthError::InvalidToken
        })?;

    match data.claims.sub.parse::<u64>() {
        Ok(user_id) if user_id > 0 => Ok(user_id),
        _ => {
            debug!("token subject is not a user id");
            Err(AuthError::InvalidToken)
        }
    }
}
