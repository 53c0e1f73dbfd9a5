/// X25519 public key length in bytes.
pub const KEY_LEN: usize = 32;

/// Derived AEAD key length in bytes.
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// AES-GCM nonce length in the combined ciphertext form.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// Share commitment MAC length (HMAC-SHA256).
pub const COMMITMENT_LEN: usize = 32;

/// HKDF info label: disclosure payload encryption key.
pub const LABEL_DISCLOSURE_ENCRYPTION: &str = "disclosure-encryption";

/// Maximum share count the GF(256) sharing field supports.
pub const MAX_SHARES: usize = 255;

/// Rendezvous points the shipped client talks to.
pub const DEFAULT_RENDEZVOUS_POINTS: [&str; 3] = [
    "https://rp1-246724171794.us-central1.run.app",
    "https://rp2-246724171794.us-central1.run.app",
    "https://rp3-246724171794.us-central1.run.app",
];
