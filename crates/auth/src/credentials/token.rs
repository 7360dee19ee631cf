//! Compact JWS encoding and verification (HMAC family only).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;

use super::CredentialError;
use crate::TokenClaims;

/// Algorithm used for every token this codec issues.
pub const ISSUED_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted on validation: the symmetric MAC family.
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Signs and verifies tokens with one symmetric secret.
#[derive(Clone)]
pub(crate) struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub(crate) fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ISSUED_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub(crate) fn encode(&self, claims: &TokenClaims) -> Result<String, CredentialError> {
        encode(&Header::new(ISSUED_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| CredentialError::SigningFailure(e.to_string()))
    }

    /// Verify the signature and decode the claims.
    ///
    /// The declared algorithm is checked before any cryptographic work so
    /// that non-MAC tokens are reported as such rather than as bad MACs.
    pub(crate) fn decode(&self, token: &str) -> Result<TokenClaims, CredentialError> {
        declared_algorithm(token)?;

        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => CredentialError::SignatureInvalid,
                ErrorKind::ExpiredSignature => CredentialError::TokenExpired,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    CredentialError::UnsupportedAlgorithm(e.to_string())
                }
                _ => CredentialError::MalformedToken(e.to_string()),
            })
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issued_algorithm", &ISSUED_ALGORITHM)
            .field("accepted_algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Read the `alg` a token declares, rejecting anything outside the MAC family.
pub fn declared_algorithm(token: &str) -> Result<Algorithm, CredentialError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(CredentialError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|e| CredentialError::MalformedToken(format!("header encoding: {e}")))?;
    let header: RawHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| CredentialError::MalformedToken(format!("header json: {e}")))?;

    match header.alg.as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(CredentialError::UnsupportedAlgorithm(other.to_string())),
    }
}
