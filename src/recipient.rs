//! Recipient identity: a named X25519 public key.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey, StaticSecret};

use crate::crypto::agreement;
use crate::encoding;

/// A registered disclosure recipient.
///
/// Identity is the key: equality and hashing ignore `name`, which is display
/// metadata chosen at registration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    #[serde(rename = "publicKey", with = "encoding::b64_key")]
    pub public_key: PublicKey,
}

impl Recipient {
    pub fn new(name: impl Into<String>, public_key: PublicKey) -> Self {
        Self {
            name: name.into(),
            public_key,
        }
    }
}

impl PartialEq for Recipient {
    fn eq(&self, other: &Self) -> bool {
        self.public_key.as_bytes() == other.public_key.as_bytes()
    }
}

impl Eq for Recipient {}

impl Hash for Recipient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public_key.as_bytes().hash(state);
    }
}

/// A recipient's static key-agreement secret.
///
/// Generated fresh when entering receive mode; persisting it across launches
/// is the caller's concern.
pub struct RecipientKey {
    secret: StaticSecret,
    public: PublicKey,
}

impl RecipientKey {
    pub fn generate() -> Self {
        let (secret, public) = agreement::generate_static();
        Self { secret, public }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Build the registration identity for this key.
    pub fn recipient(&self, name: impl Into<String>) -> Recipient {
        Recipient::new(name, self.public)
    }

    pub(crate) fn secret(&self) -> &StaticSecret {
        &self.secret
    }
}

impl From<StaticSecret> for RecipientKey {
    fn from(secret: StaticSecret) -> Self {
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_identity_is_the_key_not_the_name() {
        let key = RecipientKey::generate();
        let a = key.recipient("alice");
        let b = key.recipient("someone else entirely");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_different_keys_never_equal() {
        let a = RecipientKey::generate().recipient("alice");
        let b = RecipientKey::generate().recipient("alice");
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_wire_shape() {
        let recipient = RecipientKey::generate().recipient("alice");
        let json = serde_json::to_value(&recipient).unwrap();

        assert_eq!(json["name"], "alice");
        assert!(json["publicKey"].is_string());

        let restored: Recipient = serde_json::from_value(json).unwrap();
        assert_eq!(restored, recipient);
        assert_eq!(restored.name, "alice");
    }

    #[test]
    fn test_serde_rejects_short_key() {
        let result: Result<Recipient, _> =
            serde_json::from_str(r#"{"name":"alice","publicKey":"c2hvcnQ="}"#);
        assert!(result.is_err());
    }
}
