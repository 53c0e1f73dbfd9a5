//! Threshold secret sharing of sealed disclosure blobs.
//!
//! Interpolation is delegated to the `gf256` Shamir implementation. Each share
//! is framed as `[threshold: 1B][x: 1B][y bytes]` so the combining side can
//! check that all shares carry the same combination parameters, and that
//! enough are present, before interpolating. Without the frame, an
//! under-threshold combination would silently yield garbage.

use gf256::shamir::shamir;
use thiserror::Error;

use super::CryptoError;
use crate::constants::MAX_SHARES;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReconstructionError {
    #[error("no shares to combine")]
    Empty,

    #[error("share too short to carry its parameters")]
    Truncated,

    #[error("shares carry mismatched combination parameters")]
    MismatchedParameters,

    #[error("duplicate share index {0}")]
    DuplicateIndex(u8),

    #[error("insufficient shares: need {needed}, got {got}")]
    Insufficient { needed: usize, got: usize },
}

/// Split `secret` into `shares` framed shares, any `threshold` of which
/// reconstruct it.
pub fn split(
    secret: &[u8],
    shares: usize,
    threshold: usize,
) -> std::result::Result<Vec<Vec<u8>>, CryptoError> {
    if threshold == 0 || threshold > shares || shares > MAX_SHARES {
        return Err(CryptoError::InvalidThreshold { threshold, shares });
    }

    let raw = shamir::generate(secret, shares, threshold);
    Ok(raw
        .into_iter()
        .map(|share| {
            let mut framed = Vec::with_capacity(1 + share.len());
            framed.push(threshold as u8);
            framed.extend_from_slice(&share);
            framed
        })
        .collect())
}

/// Combine framed shares back into the secret.
pub fn combine(shares: &[impl AsRef<[u8]>]) -> std::result::Result<Vec<u8>, ReconstructionError> {
    let first = shares.first().ok_or(ReconstructionError::Empty)?.as_ref();
    if first.len() < 2 {
        return Err(ReconstructionError::Truncated);
    }
    let threshold = first[0];

    let mut seen = [false; 256];
    let mut raw: Vec<&[u8]> = Vec::with_capacity(shares.len());
    for share in shares {
        let share = share.as_ref();
        if share.len() < 2 {
            return Err(ReconstructionError::Truncated);
        }
        if share[0] != threshold || share.len() != first.len() {
            return Err(ReconstructionError::MismatchedParameters);
        }
        let x = share[1];
        if seen[x as usize] {
            return Err(ReconstructionError::DuplicateIndex(x));
        }
        seen[x as usize] = true;
        raw.push(&share[1..]);
    }

    if raw.len() < threshold as usize {
        return Err(ReconstructionError::Insufficient {
            needed: threshold as usize,
            got: raw.len(),
        });
    }

    Ok(shamir::reconstruct(&raw))
}
