//! Base64 adapters for binary JSON fields and URL path key encoding.
//!
//! The rendezvous point wire format carries binary values as standard base64
//! strings inside JSON bodies, and public keys as URL-safe base64 (no padding)
//! inside URL paths.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use x25519_dalek::PublicKey;

use crate::constants::KEY_LEN;

/// Encode a public key for use in an inbox URL path.
pub fn url_safe_key(key: &PublicKey) -> String {
    URL_SAFE_NO_PAD.encode(key.as_bytes())
}

/// Serde adapter: `Vec<u8>` as a standard base64 string.
pub(crate) mod b64 {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Engine, STANDARD};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: X25519 public key as a standard base64 string.
pub(crate) mod b64_key {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Engine, PublicKey, KEY_LEN, STANDARD};

    pub fn serialize<S: Serializer>(key: &PublicKey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(key.as_bytes()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PublicKey, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&encoded).map_err(serde::de::Error::custom)?;
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            serde::de::Error::custom(format!("expected {KEY_LEN}-byte key, got {}", b.len()))
        })?;
        Ok(PublicKey::from(bytes))
    }
}

/// Serde adapter: 32-byte MAC as a standard base64 string.
pub(crate) mod b64_mac {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Engine, STANDARD};
    use crate::constants::COMMITMENT_LEN;

    pub fn serialize<S: Serializer>(
        mac: &[u8; COMMITMENT_LEN],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(mac))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; COMMITMENT_LEN], D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&encoded).map_err(serde::de::Error::custom)?;
        bytes.try_into().map_err(|b: Vec<u8>| {
            serde::de::Error::custom(format!("expected {COMMITMENT_LEN}-byte MAC, got {}", b.len()))
        })
    }
}
