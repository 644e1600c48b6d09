//! Authentication service for admin bearer tokens.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use tracing::debug;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. This is the form stored
/// in `ADMIN_TOKEN_HASHES`.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Service for authenticating admin requests via Bearer tokens.
///
/// Only HMAC digests of the accepted tokens are configured, so reading the
/// configuration does not reveal a usable token without the signing secret.
pub struct AuthService {
    signing_secret: String,
    token_hashes: Vec<Vec<u8>>,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    /// - `token_hashes` - hex-encoded digests of accepted tokens; malformed entries are ignored
    pub fn new(signing_secret: String, token_hashes: &[String]) -> Self {
        let token_hashes = token_hashes
            .iter()
            .filter_map(|h| hex::decode(h.trim()).ok())
            .collect();

        Self {
            signing_secret,
            token_hashes,
        }
    }

    /// Returns true if at least one admin token is configured.
    pub fn is_enabled(&self) -> bool {
        !self.token_hashes.is_empty()
    }

    /// Authenticates a raw token against the configured digests.
    ///
    /// Comparison is constant-time per digest.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token matches no configured digest.
    pub fn authenticate(&self, token: &str) -> Result<(), AppError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());

        let matched = self
            .token_hashes
            .iter()
            .any(|expected| mac.clone().verify_slice(expected).is_ok());

        if !matched {
            debug!("Rejected admin token");
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        }

        Ok(())
    }
}
