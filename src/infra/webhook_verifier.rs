//! Webhook signature verification.
//!
//! The gateway signs the exact raw request bytes with HMAC-SHA256 and
//! sends the hex digest in `X-Signature`. Verification must run over the
//! same raw bytes — parsing and re-serializing the body can change it
//! byte-for-byte and break the match.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `body` under `secret`. Used by the gateway on send
/// and by tests to produce valid signatures.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Compare the claimed signature against the one computed over the raw
/// body. Returns false on any mismatch or malformed claim; never panics.
/// A missing secret is a startup configuration error, not handled here.
pub fn verify_signature(raw_body: &[u8], claimed: &str, secret: &str) -> bool {
    let expected = sign_payload(secret, raw_body);
    constant_time_compare(claimed, &expected)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
