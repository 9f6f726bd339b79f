//! Request signing check for Events API callbacks.
//!
//! Slack signs `v0:{timestamp}:{body}` with the app's signing secret using HMAC-SHA256
//! and sends the hex digest as `v0=<hex>` in `X-Slack-Signature`. Requests whose
//! timestamp is more than five minutes away from local time are rejected.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const MAX_CLOCK_SKEW_SECS: u64 = 60 * 5;

const SIGNATURE_VERSION: &str = "v0";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing request header `{0}`")]
    MissingHeader(&'static str),
    #[error("request timestamp is not a unix time")]
    MalformedTimestamp,
    #[error("request timestamp is outside the allowed window")]
    Stale,
    #[error("signature is not a `v0=` hex digest")]
    MalformedSignature,
    #[error("signature does not match request body")]
    Mismatch,
}

pub struct SignatureVerifier {
    signing_secret: SecretString,
}

impl SignatureVerifier {
    pub fn new(signing_secret: SecretString) -> Self {
        Self { signing_secret }
    }

    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        self.verify_at(timestamp, signature, body, Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

        let sent_at: i64 =
            timestamp.trim().parse().map_err(|_| SignatureError::MalformedTimestamp)?;
        if now.abs_diff(sent_at) > MAX_CLOCK_SKEW_SECS {
            return Err(SignatureError::Stale);
        }

        let digest = signature
            .strip_prefix(SIGNATURE_VERSION)
            .and_then(|rest| rest.strip_prefix('='))
            .and_then(|hex_digest| hex::decode(hex_digest).ok())
            .ok_or(SignatureError::MalformedSignature)?;

        let mut mac = self.mac(timestamp)?;
        mac.update(body);
        mac.verify_slice(&digest).map_err(|_| SignatureError::Mismatch)
    }

    /// Hex signature for `body`, in the header format Slack sends.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
        let mut mac = self.mac(timestamp)?;
        mac.update(body);
        Ok(format!("{SIGNATURE_VERSION}={}", hex::encode(mac.finalize().into_bytes())))
    }

    fn mac(&self, timestamp: &str) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.expose_secret().as_bytes())
            .map_err(|_| SignatureError::Mismatch)?;
        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        Ok(mac)
    }
}
