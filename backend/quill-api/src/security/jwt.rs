/// Session token codec
///
/// Issues and verifies the signed, self-contained tokens carried in the
/// `access_token` cookie. Tokens encode the subject id, the admin flag at
/// issuance time, and issued-at/expiry timestamps, signed with a single
/// process-wide HS256 secret loaded once at startup.
///
/// ## Contract
///
/// - `initialize_jwt_keys` MUST run during startup before any token
///   operation; issuing without it is a configuration error.
/// - Expiry is strict: a token is accepted only while `now < exp`. At
///   exactly `exp` it is rejected.
/// - `verify` reports every failure (malformed, bad signature, expired,
///   keys missing) as a `TokenError`; callers treat all of them as
///   "unauthenticated", never as a request failure.
/// - There is no revocation list. Signout only deletes the client cookie,
///   so a signed-out token stays verifiable until it expires.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims embedded in a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id, decimal string)
    pub sub: String,
    /// Admin flag as recorded at issuance
    pub is_admin: bool,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp, exclusive)
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing secret is empty")]
    EmptySecret,

    #[error("token keys already initialized")]
    AlreadyInitialized,

    #[error("token keys not initialized; call initialize_jwt_keys() during startup")]
    KeysNotInitialized,

    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,
}

/// Keys are derived from the shared secret once at startup and never
/// modified afterwards.
static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Initialize the signing and verification keys from the shared secret.
///
/// Must be called once during startup. Subsequent calls fail.
pub fn initialize_jwt_keys(secret: &str) -> Result<(), TokenError> {
    if secret.is_empty() {
        return Err(TokenError::EmptySecret);
    }

    JWT_ENCODING_KEY
        .set(EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| TokenError::AlreadyInitialized)?;

    JWT_DECODING_KEY
        .set(DecodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| TokenError::AlreadyInitialized)?;

    Ok(())
}

fn get_encoding_key() -> Result<&'static EncodingKey, TokenError> {
    JWT_ENCODING_KEY.get().ok_or(TokenError::KeysNotInitialized)
}

fn get_decoding_key() -> Result<&'static DecodingKey, TokenError> {
    JWT_DECODING_KEY.get().ok_or(TokenError::KeysNotInitialized)
}

/// Issue a signed session token for `subject_id` valid for `ttl`.
pub fn issue(subject_id: i64, is_admin: bool, ttl: Duration) -> Result<String, TokenError> {
    let now = Utc::now();

    let claims = Claims {
        sub: subject_id.to_string(),
        is_admin,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    let encoding_key = get_encoding_key()?;
    Ok(encode(&Header::new(JWT_ALGORITHM), &claims, encoding_key)?)
}

/// Verify a token's signature and expiry and return its claims.
///
/// Verification is pure: no storage lookup happens here. The identity
/// resolver separately re-checks the subject against storage.
pub fn verify(token: &str) -> Result<Claims, TokenError> {
    let decoding_key = get_decoding_key()?;

    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 0;

    let data = decode::<Claims>(token, decoding_key, &validation)?;

    // jsonwebtoken treats `exp == now` as still valid; the contract here is
    // an exclusive bound.
    if Utc::now().timestamp() >= data.claims.exp {
        return Err(TokenError::Expired);
    }

    Ok(data.claims)
}
