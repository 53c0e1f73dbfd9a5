//! AES-256-GCM in combined form: [nonce: 12B][ciphertext][tag: 16B].
//!
//! The nonce is generated fresh per seal and travels inside the blob, so a
//! sealed value is self-contained once the peer holds the symmetric key.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use super::{CryptoError, Result};
use crate::constants::{NONCE_LEN, SYMMETRIC_KEY_LEN, TAG_LEN};

/// Seal plaintext under `key` with a fresh random nonce.
pub fn seal(key: &[u8; SYMMETRIC_KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.into());

    let mut nonce_bytes = [0u8; NONCE_LEN];
    getrandom::getrandom(&mut nonce_bytes).map_err(|e| CryptoError::Random(e.to_string()))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::Seal(e.to_string()))?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);
    Ok(combined)
}

/// Open a combined blob, verifying the authentication tag.
pub fn open(key: &[u8; SYMMETRIC_KEY_LEN], combined: &[u8]) -> Result<Vec<u8>> {
    if combined.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::TruncatedCiphertext(combined.len()));
    }

    let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(key.into());

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| CryptoError::Open(e.to_string()))
}
