//! Access token issuance and verification.
//!
//! Access tokens are stateless HMAC-signed JWTs. They are never stored and
//! never revoked individually; they simply expire.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Identity};
use crate::unix_now;

/// Issuer claim stamped on every access token.
pub const ISSUER: &str = "chirpy";

/// Lifetime of access tokens minted by the refresh endpoint, and the default
/// (and maximum) for login.
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Algorithms accepted on verify. Must agree with `check_algorithm`.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer
    pub iss: String,
    /// Subject (user UUID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Only the field we need from the JOSE header, parsed leniently so unknown
/// algorithm names (including `none`) still deserialize.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Signs and verifies access tokens with a process-wide secret.
#[derive(Clone)]
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AccessTokenCodec {
    /// Create a codec from the shared signing secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked by hand below so that a zero TTL is already expired.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token asserting `identity`, valid for `ttl` from now.
    pub fn issue(&self, identity: Identity, ttl: Duration) -> Result<String, AuthError> {
        let now = unix_now();
        let claims = AccessClaims {
            iss: ISSUER.to_string(),
            sub: identity.to_string(),
            iat: now,
            exp: now.saturating_add(ttl.as_secs()),
        };
        self.encode_claims(&claims)
    }

    pub(crate) fn encode_claims(&self, claims: &AccessClaims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningFailure(e.to_string()))
    }

    /// Verify a token and return the identity it asserts.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_claims(token).and_then(|claims| {
            claims
                .sub
                .parse::<Identity>()
                .map_err(|_| AuthError::UnparseableIdentity)
        })
    }

    /// Verify a token and return its claims without interpreting the subject.
    pub fn verify_claims(&self, token: &str) -> Result<AccessClaims, AuthError> {
        check_algorithm(token)?;

        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => AuthError::UnsupportedSigningAlgorithm,
                _ => AuthError::MalformedCredential,
            })?;

        // The issuer is not checked.
        if unix_now() >= data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(data.claims)
    }
}

/// Reject tokens whose header declares a non-HMAC algorithm, before the
/// signature is looked at.
fn check_algorithm(token: &str) -> Result<(), AuthError> {
    let header_segment = token.split('.').next().unwrap_or_default();
    let bytes = URL_SAFE_NO_PAD
        .decode(header_segment)
        .map_err(|_| AuthError::MalformedCredential)?;
    let header: RawHeader =
        serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedCredential)?;

    match header.alg.as_str() {
        "HS256" | "HS384" | "HS512" => Ok(()),
        _ => Err(AuthError::UnsupportedSigningAlgorithm),
    }
}
