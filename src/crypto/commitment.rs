//! Keyed share commitments: HMAC-SHA256 binding a share to a disclosure id.
//!
//! The MAC key is the same symmetric key used to seal the disclosure, so only
//! a party holding the recipient key material can verify a commitment.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::constants::COMMITMENT_LEN;

type HmacSha256 = Hmac<Sha256>;

/// Compute `HMAC-SHA256(key, disclosure_id || share_data)`.
pub fn commit(key: &[u8], disclosure_id: Uuid, share_data: &[u8]) -> [u8; COMMITMENT_LEN] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(disclosure_id.as_bytes());
    mac.update(share_data);
    mac.finalize().into_bytes().into()
}

/// Verify a commitment MAC in constant time.
pub fn verify(key: &[u8], disclosure_id: Uuid, share_data: &[u8], expected: &[u8]) -> bool {
    let computed = commit(key, disclosure_id, share_data);
    constant_time_eq(&computed, expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
