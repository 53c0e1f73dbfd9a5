//! The disclosure crypto pipeline.
//!
//! Sending: serialize the disclosure, seal it to the recipient via an
//! ephemeral agreement, split the sealed blob into threshold shares, and
//! attach a keyed commitment to each share. Receiving runs the inverse:
//! combine enough shares, open the blob, parse. Commitments let a recipient
//! check a single share's integrity before the rest have arrived.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use x25519_dalek::PublicKey;
use zeroize::Zeroize;

use crate::constants::{LABEL_DISCLOSURE_ENCRYPTION, SYMMETRIC_KEY_LEN};
use crate::crypto::sharing::{self, ReconstructionError};
use crate::crypto::{aead, agreement, commitment};
use crate::encoding;
use crate::error::Result;
use crate::recipient::{Recipient, RecipientKey};

/// An anonymous disclosure payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    /// Generated at creation; bound into every share's commitment.
    pub id: Uuid,
    pub text: String,
    pub author: String,
    /// Stamped by the receiving coordinator from the rendezvous point
    /// grouping key; never set by the author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl Disclosure {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            author: author.into(),
            organization: None,
        }
    }

    /// Seal this disclosure for `recipient_key`, returning the sealed blob,
    /// the symmetric key (for share commitments) and the ephemeral public key.
    fn seal_for(
        &self,
        recipient_key: &PublicKey,
    ) -> Result<(Vec<u8>, [u8; SYMMETRIC_KEY_LEN], PublicKey)> {
        let (ephemeral_secret, ephemeral_public) = agreement::generate_ephemeral();
        let key = agreement::agree_ephemeral(
            ephemeral_secret,
            recipient_key,
            LABEL_DISCLOSURE_ENCRYPTION.as_bytes(),
        )?;
        let plaintext = serde_json::to_vec(self)?;
        let sealed = aead::seal(&key, &plaintext)?;
        Ok((sealed, key, ephemeral_public))
    }

    /// Encrypt to a recipient public key.
    ///
    /// The ephemeral public key travels alongside the ciphertext, not inside
    /// it: the decrypting party needs it before it can derive the key.
    pub fn encrypt(&self, recipient_key: &PublicKey) -> Result<(EncryptedDisclosure, PublicKey)> {
        let (sealed, mut key, ephemeral_public) = self.seal_for(recipient_key)?;
        key.zeroize();
        Ok((EncryptedDisclosure { ciphertext: sealed }, ephemeral_public))
    }

    /// Encrypt to `recipient` and split into `shares` verifiable shares, any
    /// `threshold` of which reconstruct the sealed blob.
    pub fn encrypt_and_split(
        &self,
        recipient: &Recipient,
        shares: usize,
        threshold: usize,
    ) -> Result<Vec<VerifiableShare>> {
        let (sealed, mut key, ephemeral_public) = self.seal_for(&recipient.public_key)?;
        let framed = sharing::split(&sealed, shares, threshold)?;
        let verifiable = framed
            .into_iter()
            .map(|data| {
                let commitment = commitment::commit(&key, self.id, &data);
                VerifiableShare {
                    data,
                    commitment,
                    ephemeral_key: ephemeral_public,
                }
            })
            .collect();
        key.zeroize();
        Ok(verifiable)
    }
}

/// A disclosure sealed for a recipient: AEAD combined form under a key derived
/// from an ephemeral X25519 agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedDisclosure {
    #[serde(with = "encoding::b64")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedDisclosure {
    /// Combine at least `threshold` shares back into the sealed blob.
    ///
    /// All shares must carry the same combination parameters; inconsistent or
    /// insufficient input is an error, never a garbage blob.
    pub fn reconstruct(
        shares: &[VerifiableShare],
    ) -> std::result::Result<Self, ReconstructionError> {
        let data: Vec<&[u8]> = shares.iter().map(|share| share.data.as_slice()).collect();
        let ciphertext = sharing::combine(&data)?;
        Ok(Self { ciphertext })
    }

    /// Open the sealed blob and parse the disclosure.
    ///
    /// The authentication tag is the sole tamper check at this layer; a wrong
    /// key or a corrupted blob fails here.
    pub fn decrypt(
        &self,
        recipient_key: &RecipientKey,
        ephemeral_key: &PublicKey,
    ) -> Result<Disclosure> {
        let mut key = agreement::agree_static(
            recipient_key.secret(),
            ephemeral_key,
            LABEL_DISCLOSURE_ENCRYPTION.as_bytes(),
        )?;
        let opened = aead::open(&key, &self.ciphertext);
        key.zeroize();
        let plaintext = opened?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

/// One threshold share of an encrypted disclosure, plus a keyed integrity tag
/// binding it to a specific disclosure id and its own content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableShare {
    #[serde(with = "encoding::b64")]
    pub data: Vec<u8>,
    #[serde(with = "encoding::b64_mac")]
    pub commitment: [u8; 32],
    #[serde(with = "encoding::b64_key")]
    pub ephemeral_key: PublicKey,
}

impl VerifiableShare {
    /// Check that this share was produced for `disclosure_id` by a sender who
    /// sealed to this recipient.
    ///
    /// Comparison is constant-time. Returns false rather than erroring on any
    /// derivation failure: an unverifiable share is treated as absent.
    pub fn verify(&self, disclosure_id: Uuid, recipient_key: &RecipientKey) -> bool {
        match agreement::agree_static(
            recipient_key.secret(),
            &self.ephemeral_key,
            LABEL_DISCLOSURE_ENCRYPTION.as_bytes(),
        ) {
            Ok(mut key) => {
                let ok = commitment::verify(&key, disclosure_id, &self.data, &self.commitment);
                key.zeroize();
                ok
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CryptoError;
    use crate::error::RendezvousError;

    fn recipient_for(key: &RecipientKey) -> Recipient {
        key.recipient("test")
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let disclosure = Disclosure::new("the password is swordfish", "nora");
        let key = RecipientKey::generate();

        let (encrypted, ephemeral) = disclosure.encrypt(key.public_key()).unwrap();
        let decrypted = encrypted.decrypt(&key, &ephemeral).unwrap();

        assert_eq!(decrypted, disclosure);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let disclosure = Disclosure::new("secret", "nora");
        let key = RecipientKey::generate();
        let other = RecipientKey::generate();

        let (encrypted, ephemeral) = disclosure.encrypt(key.public_key()).unwrap();
        let result = encrypted.decrypt(&other, &ephemeral);

        assert!(matches!(
            result,
            Err(RendezvousError::Crypto(CryptoError::Open(_)))
        ));
    }

    #[test]
    fn test_decrypt_with_wrong_ephemeral_fails() {
        let disclosure = Disclosure::new("secret", "nora");
        let key = RecipientKey::generate();
        let (_, wrong_ephemeral) = crate::crypto::agreement::generate_static();

        let (encrypted, _) = disclosure.encrypt(key.public_key()).unwrap();
        assert!(encrypted.decrypt(&key, &wrong_ephemeral).is_err());
    }

    #[test]
    fn test_split_and_reconstruct_from_any_threshold_subset() {
        let disclosure = Disclosure::new("top secret", "nora");
        let key = RecipientKey::generate();
        let recipient = recipient_for(&key);

        let shares = disclosure.encrypt_and_split(&recipient, 5, 3).unwrap();
        assert_eq!(shares.len(), 5);

        let subset = &shares[2..5];
        let reconstructed = EncryptedDisclosure::reconstruct(subset).unwrap();
        let decrypted = reconstructed
            .decrypt(&key, &subset[0].ephemeral_key)
            .unwrap();

        assert_eq!(decrypted, disclosure);
    }

    #[test]
    fn test_reconstruct_below_threshold_fails() {
        let disclosure = Disclosure::new("too few", "nora");
        let key = RecipientKey::generate();
        let recipient = recipient_for(&key);

        let shares = disclosure.encrypt_and_split(&recipient, 5, 4).unwrap();
        let result = EncryptedDisclosure::reconstruct(&shares[..2]);

        assert_eq!(
            result,
            Err(ReconstructionError::Insufficient { needed: 4, got: 2 })
        );
    }

    #[test]
    fn test_invalid_threshold_parameters_fail() {
        let disclosure = Disclosure::new("bad params", "nora");
        let key = RecipientKey::generate();
        let recipient = recipient_for(&key);

        let result = disclosure.encrypt_and_split(&recipient, 3, 4);
        assert!(matches!(
            result,
            Err(RendezvousError::Crypto(CryptoError::InvalidThreshold { .. }))
        ));
    }

    #[test]
    fn test_commitment_soundness() {
        let disclosure = Disclosure::new("verify me", "nora");
        let key = RecipientKey::generate();
        let recipient = recipient_for(&key);

        let shares = disclosure.encrypt_and_split(&recipient, 3, 3).unwrap();

        // Honest shares verify.
        for share in &shares {
            assert!(share.verify(disclosure.id, &key));
        }

        // A flipped bit in the data does not.
        let mut tampered = shares[0].clone();
        tampered.data[2] ^= 0x01;
        assert!(!tampered.verify(disclosure.id, &key));

        // The wrong disclosure id does not.
        assert!(!shares[0].verify(Uuid::new_v4(), &key));

        // The wrong recipient key does not.
        let other = RecipientKey::generate();
        assert!(!shares[0].verify(disclosure.id, &other));
    }

    #[test]
    fn test_share_wire_shape() {
        let disclosure = Disclosure::new("wire", "nora");
        let key = RecipientKey::generate();
        let recipient = recipient_for(&key);

        let shares = disclosure.encrypt_and_split(&recipient, 3, 3).unwrap();
        let json = serde_json::to_value(&shares[0]).unwrap();

        assert!(json["data"].is_string());
        assert!(json["commitment"].is_string());
        assert!(json["ephemeralKey"].is_string());

        let restored: VerifiableShare = serde_json::from_value(json).unwrap();
        assert_eq!(restored, shares[0]);
        assert!(restored.verify(disclosure.id, &key));
    }

    #[test]
    fn test_disclosure_json_omits_unset_organization() {
        let disclosure = Disclosure::new("hello", "nora");
        let json = serde_json::to_value(&disclosure).unwrap();
        assert!(json.get("organization").is_none());

        let mut stamped = disclosure;
        stamped.organization = Some("acme".to_string());
        let json = serde_json::to_value(&stamped).unwrap();
        assert_eq!(json["organization"], "acme");
    }
}
