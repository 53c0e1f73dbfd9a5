//! X25519 key agreement and HKDF-SHA256 symmetric key derivation.
//!
//! Every sealed payload uses a fresh ephemeral keypair on the sending side;
//! the receiving side re-derives the same key from its static secret and the
//! sender's ephemeral public key.

use hkdf::Hkdf;
use rand::rngs::OsRng;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};
use zeroize::Zeroize;

use super::{CryptoError, Result};
use crate::constants::SYMMETRIC_KEY_LEN;

/// Generate a one-shot X25519 keypair for a single agreement.
pub fn generate_ephemeral() -> (EphemeralSecret, PublicKey) {
    let secret = EphemeralSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    (secret, public)
}

/// Generate a static X25519 keypair (a recipient identity key).
pub fn generate_static() -> (StaticSecret, PublicKey) {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    (secret, public)
}

/// Derive a 32-byte symmetric key from an X25519 shared secret.
///
/// HKDF-SHA256 with empty salt; `info` carries the context label, or is empty
/// where the peer derives without one.
pub fn derive_symmetric_key(
    shared_secret: &[u8; 32],
    info: &[u8],
) -> Result<[u8; SYMMETRIC_KEY_LEN]> {
    let hkdf = Hkdf::<Sha256>::new(None, shared_secret);
    let mut key = [0u8; SYMMETRIC_KEY_LEN];
    hkdf.expand(info, &mut key)
        .map_err(|e| CryptoError::HkdfDerive(e.to_string()))?;
    Ok(key)
}

/// Agree with a one-shot secret (consumed) and derive the symmetric key.
pub fn agree_ephemeral(
    secret: EphemeralSecret,
    peer: &PublicKey,
    info: &[u8],
) -> Result<[u8; SYMMETRIC_KEY_LEN]> {
    let mut shared = secret.diffie_hellman(peer).to_bytes();
    let key = derive_symmetric_key(&shared, info);
    shared.zeroize();
    key
}

/// Agree with a static secret and derive the symmetric key.
pub fn agree_static(
    secret: &StaticSecret,
    peer: &PublicKey,
    info: &[u8],
) -> Result<[u8; SYMMETRIC_KEY_LEN]> {
    let mut shared = secret.diffie_hellman(peer).to_bytes();
    let key = derive_symmetric_key(&shared, info);
    shared.zeroize();
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_sides_derive_same_key() {
        let (ephemeral_secret, ephemeral_public) = generate_ephemeral();
        let (static_secret, static_public) = generate_static();

        let sender = agree_ephemeral(ephemeral_secret, &static_public, b"context").unwrap();
        let receiver = agree_static(&static_secret, &ephemeral_public, b"context").unwrap();

        assert_eq!(sender, receiver);
    }

    #[test]
    fn test_info_separates_keys() {
        let (static_secret, _) = generate_static();
        let (_, peer_public) = generate_static();

        let a = agree_static(&static_secret, &peer_public, b"context-a").unwrap();
        let b = agree_static(&static_secret, &peer_public, b"context-b").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_different_peers_derive_different_keys() {
        let (static_secret, _) = generate_static();
        let (_, peer1) = generate_static();
        let (_, peer2) = generate_static();

        let a = agree_static(&static_secret, &peer1, b"context").unwrap();
        let b = agree_static(&static_secret, &peer2, b"context").unwrap();

        assert_ne!(a, b);
    }
}
