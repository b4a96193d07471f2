//! Mercado Pago webhook signature verification.
//!
//! The gateway signs a manifest built from the resource id, the
//! `x-request-id` header and the timestamp:
//!
//! ```text
//! id:<data.id>;request-id:<x-request-id>;ts:<ts>;
//! ```
//!
//! with HMAC-SHA256 keyed by the webhook secret, and sends
//! `x-signature: ts=<ts>,v1=<hex>`. Parts whose value is absent are left out
//! of the manifest.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::WebhookError;

/// Default maximum age of a signature.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Maximum allowed clock skew for future timestamps.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Timestamps above this (10^12) are milliseconds rather than seconds.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Parsed `x-signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Timestamp exactly as sent; it is part of the signed manifest.
    pub ts: String,
    /// v1 signature (HMAC-SHA256).
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses an `x-signature` header.
    ///
    /// Format: `ts=<timestamp>,v1=<signature>`
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` if the header format is invalid.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut ts: Option<String> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key.trim() {
                "ts" => {
                    let value = value.trim();
                    value.parse::<i64>().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?;
                    ts = Some(value.to_string());
                }
                "v1" => {
                    v1_signature = Some(hex::decode(value.trim()).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        Ok(SignatureHeader {
            ts: ts.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?,
            v1_signature: v1_signature
                .ok_or_else(|| WebhookError::ParseError("missing v1 signature".to_string()))?,
        })
    }

    /// Timestamp in seconds, accepting millisecond values.
    fn unix_secs(&self) -> i64 {
        let raw: i64 = self.ts.parse().unwrap_or_default();
        if raw > MILLIS_THRESHOLD {
            raw / 1000
        } else {
            raw
        }
    }
}

/// Builds the signed manifest.
pub fn signature_manifest(data_id: Option<&str>, request_id: Option<&str>, ts: &str) -> String {
    let mut manifest = String::new();
    if let Some(id) = data_id.filter(|id| !id.is_empty()) {
        let id = if id.chars().all(|c| c.is_ascii_alphanumeric()) {
            id.to_ascii_lowercase()
        } else {
            id.to_string()
        };
        manifest.push_str(&format!("id:{};", id));
    }
    if let Some(request_id) = request_id.filter(|r| !r.is_empty()) {
        manifest.push_str(&format!("request-id:{};", request_id));
    }
    if !ts.is_empty() {
        manifest.push_str(&format!("ts:{};", ts));
    }
    manifest
}

/// Verifier for Mercado Pago webhook signatures.
#[derive(Clone)]
pub struct MercadoPagoSignatureVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl MercadoPagoSignatureVerifier {
    /// Creates a verifier with the default five minute tolerance.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_tolerance_secs(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verifies the `x-signature` header of a notification.
    ///
    /// # Errors
    ///
    /// - `ParseError` - malformed header
    /// - `TimestampOutOfRange` - signature older than the tolerance
    /// - `InvalidTimestamp` - signature from the future
    /// - `InvalidSignature` - HMAC mismatch
    pub fn verify(
        &self,
        signature_header: &str,
        request_id: Option<&str>,
        data_id: Option<&str>,
    ) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;
        self.validate_timestamp(header.unix_secs(), chrono::Utc::now().timestamp())?;

        let manifest = signature_manifest(data_id, request_id, &header.ts);
        let expected = self.compute_signature(&manifest)?;

        if !constant_time_compare(&expected, &header.v1_signature) {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }

    fn validate_timestamp(&self, timestamp: i64, now: i64) -> Result<(), WebhookError> {
        if timestamp <= 0 {
            return Err(WebhookError::InvalidTimestamp);
        }
        let age = now
            .checked_sub(timestamp)
            .ok_or(WebhookError::InvalidTimestamp)?;
        if age > self.tolerance_secs {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }
        Ok(())
    }

    fn compute_signature(&self, manifest: &str) -> Result<Vec<u8>, WebhookError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(manifest.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl std::fmt::Debug for MercadoPagoSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MercadoPagoSignatureVerifier")
            .field("secret", &"[REDACTED]")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

/// Constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a valid `x-signature` header, for tests and local tooling.
pub fn sign_notification(
    secret: &str,
    ts: i64,
    request_id: Option<&str>,
    data_id: Option<&str>,
) -> String {
    let ts = ts.to_string();
    let manifest = signature_manifest(data_id, request_id, &ts);
    let signature = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map(|mut mac| {
            mac.update(manifest.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        })
        .unwrap_or_default();
    format!("ts={},v1={}", ts, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "mp_webhook_secret";

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    #[test]
    fn parse_header() {
        let header = SignatureHeader::parse(&format!("ts=1704908010,v1={}", "ab".repeat(32)))
            .unwrap();
        assert_eq!(header.ts, "1704908010");
        assert_eq!(header.v1_signature.len(), 32);
    }

    #[test]
    fn parse_header_tolerates_spaces_and_unknown_parts() {
        let header =
            SignatureHeader::parse(&format!("ts=1704908010, v1={}, v2=x", "ab".repeat(32)))
                .unwrap();
        assert_eq!(header.ts, "1704908010");
    }

    #[test]
    fn parse_header_requires_both_parts() {
        assert!(matches!(
            SignatureHeader::parse("ts=1704908010"),
            Err(WebhookError::ParseError(_))
        ));
        assert!(matches!(
            SignatureHeader::parse(&format!("v1={}", "ab".repeat(32))),
            Err(WebhookError::ParseError(_))
        ));
        assert!(matches!(
            SignatureHeader::parse("garbage"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn manifest_includes_present_parts_in_order() {
        assert_eq!(
            signature_manifest(Some("123"), Some("req-1"), "1700000000"),
            "id:123;request-id:req-1;ts:1700000000;"
        );
        assert_eq!(
            signature_manifest(None, Some("req-1"), "1700000000"),
            "request-id:req-1;ts:1700000000;"
        );
        assert_eq!(
            signature_manifest(Some("123"), None, "1700000000"),
            "id:123;ts:1700000000;"
        );
    }

    #[test]
    fn manifest_lowercases_alphanumeric_ids() {
        assert_eq!(
            signature_manifest(Some("ABC123"), None, "1"),
            "id:abc123;ts:1;"
        );
        assert_eq!(
            signature_manifest(Some("AB-12"), None, "1"),
            "id:AB-12;ts:1;"
        );
    }

    #[test]
    fn valid_signature_verifies() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        let header = sign_notification(SECRET, now(), Some("req-1"), Some("999"));
        assert_eq!(verifier.verify(&header, Some("req-1"), Some("999")), Ok(()));
    }

    #[test]
    fn millisecond_timestamps_verify() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        let header = sign_notification(SECRET, now() * 1000, Some("req-1"), Some("999"));
        assert_eq!(verifier.verify(&header, Some("req-1"), Some("999")), Ok(()));
    }

    #[test]
    fn seconds_just_below_millisecond_threshold_are_not_scaled() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        let header = sign_notification(SECRET, MILLIS_THRESHOLD - 1, None, Some("999"));
        assert_eq!(
            verifier.verify(&header, None, Some("999")),
            Err(WebhookError::InvalidTimestamp)
        );
    }

    #[test]
    fn negative_and_extreme_timestamps_are_invalid() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        let v1 = "ab".repeat(32);
        for ts in [i64::MIN, -1, 0, i64::MAX] {
            let header = format!("ts={},v1={}", ts, v1);
            assert_eq!(
                verifier.verify(&header, Some("req-1"), Some("999")),
                Err(WebhookError::InvalidTimestamp),
                "ts={}",
                ts
            );
        }
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        let header = sign_notification("other", now(), Some("req-1"), Some("999"));
        assert_eq!(
            verifier.verify(&header, Some("req-1"), Some("999")),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_data_id_is_rejected() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        let header = sign_notification(SECRET, now(), Some("req-1"), Some("999"));
        assert_eq!(
            verifier.verify(&header, Some("req-1"), Some("1000")),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn old_signature_is_out_of_range() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        let header = sign_notification(SECRET, now() - 301, Some("req-1"), Some("999"));
        assert_eq!(
            verifier.verify(&header, Some("req-1"), Some("999")),
            Err(WebhookError::TimestampOutOfRange)
        );
    }

    #[test]
    fn custom_tolerance_is_applied() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET).with_tolerance_secs(900);
        let header = sign_notification(SECRET, now() - 600, None, Some("999"));
        assert_eq!(verifier.verify(&header, None, Some("999")), Ok(()));
    }

    #[test]
    fn future_signature_is_invalid() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        let header = sign_notification(SECRET, now() + 120, Some("req-1"), Some("999"));
        assert_eq!(
            verifier.verify(&header, Some("req-1"), Some("999")),
            Err(WebhookError::InvalidTimestamp)
        );
    }

    #[test]
    fn small_clock_skew_is_tolerated() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        let header = sign_notification(SECRET, now() + 30, Some("req-1"), Some("999"));
        assert_eq!(verifier.verify(&header, Some("req-1"), Some("999")), Ok(()));
    }

    #[test]
    fn debug_redacts_secret() {
        let verifier = MercadoPagoSignatureVerifier::new(SECRET);
        assert!(!format!("{:?}", verifier).contains(SECRET));
    }
}
