//! Signed, time-bound download authorization tokens.
//!
//! Minted when step-up verification succeeds and checked by the secure
//! document download endpoint. Tokens are self-contained: no database
//! lookup, no revocation. The payload carries the authorized document id
//! and an expiry instant; an HMAC-SHA256 tag gives integrity, so a token
//! cannot be forged or rebound to another document.
//!
//! Format: URL-safe base64 of `"{document_id}:{expires_at_millis}" || tag`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const TAG_LEN: usize = 32;

/// Default validity window for a minted token.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 10 * 60;

fn tag(key: &[u8], payload: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length; new_from_slice cannot fail for SHA-256.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Current time in milliseconds since the epoch.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis()
        .try_into()
        .unwrap_or(i64::MAX)
}

/// Mint a token authorizing one download of `document_id`.
#[must_use]
pub fn mint(key: &[u8], document_id: Uuid, now_millis: i64, ttl_seconds: i64) -> String {
    let expires_at = now_millis.saturating_add(ttl_seconds.saturating_mul(1000));
    let payload = format!("{document_id}:{expires_at}");
    let mut raw = payload.into_bytes();
    let tag = tag(key, &raw);
    raw.extend_from_slice(&tag);
    URL_SAFE_NO_PAD.encode(raw)
}

/// Verify a token against the requested document id.
///
/// Fails closed: any decode, parse, or tag error returns `false`. Succeeds
/// only when the tag is valid, the token is unexpired (`expires_at` strictly
/// greater than `now_millis`), and the embedded document id matches.
#[must_use]
pub fn verify(key: &[u8], token: &str, requested_document_id: Uuid, now_millis: i64) -> bool {
    let Ok(raw) = URL_SAFE_NO_PAD.decode(token.trim()) else {
        return false;
    };
    if raw.len() <= TAG_LEN {
        return false;
    }
    let (payload, token_tag) = raw.split_at(raw.len() - TAG_LEN);

    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };
    mac.update(payload);
    if mac.verify_slice(token_tag).is_err() {
        return false;
    }

    let Ok(payload) = std::str::from_utf8(payload) else {
        return false;
    };
    let Some((id_part, expiry_part)) = payload.rsplit_once(':') else {
        return false;
    };
    let Ok(document_id) = Uuid::parse_str(id_part) else {
        return false;
    };
    let Ok(expires_at) = expiry_part.parse::<i64>() else {
        return false;
    };

    expires_at > now_millis && document_id == requested_document_id
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-download-token-key";
    const TTL: i64 = 600;

    #[test]
    fn mint_then_verify_same_document() {
        let id = Uuid::new_v4();
        let token = mint(KEY, id, 1_000, TTL);
        assert!(verify(KEY, &token, id, 1_000));
    }

    #[test]
    fn verify_rejects_other_document() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let token = mint(KEY, id, 1_000, TTL);
        assert!(!verify(KEY, &token, other, 1_000));
    }

    #[test]
    fn verify_rejects_garbage_without_panicking() {
        let id = Uuid::new_v4();
        assert!(!verify(KEY, "", id, 0));
        assert!(!verify(KEY, "not base64 ???", id, 0));
        assert!(!verify(KEY, "QQ", id, 0));
        let long_garbage = URL_SAFE_NO_PAD.encode([0u8; 64]);
        assert!(!verify(KEY, &long_garbage, id, 0));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let id = Uuid::new_v4();
        let token = mint(KEY, id, 1_000, TTL);
        assert!(!verify(b"another-key", &token, id, 1_000));
    }

    #[test]
    fn expiry_boundary_is_strict() {
        let id = Uuid::new_v4();
        let minted_at = 1_000;
        let expires_at = minted_at + TTL * 1000;
        let token = mint(KEY, id, minted_at, TTL);
        // One millisecond before expiry: accepted.
        assert!(verify(KEY, &token, id, expires_at - 1));
        // At expiry and one millisecond after: rejected.
        assert!(!verify(KEY, &token, id, expires_at));
        assert!(!verify(KEY, &token, id, expires_at + 1));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let id = Uuid::new_v4();
        let token = mint(KEY, id, 1_000, TTL);
        let mut raw = URL_SAFE_NO_PAD.decode(&token).unwrap();
        raw[0] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(raw);
        assert!(!verify(KEY, &tampered, id, 1_000));
    }
}
