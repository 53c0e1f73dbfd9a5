pub mod aead;
pub mod agreement;
pub mod commitment;
pub mod sharing;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("HKDF derivation failed: {0}")]
    HkdfDerive(String),

    #[error("AES-GCM encryption failed: {0}")]
    Seal(String),

    #[error("AES-GCM decryption failed: {0}")]
    Open(String),

    #[error("ciphertext too short: {0} bytes")]
    TruncatedCiphertext(usize),

    #[error("invalid public key length: expected 32, got {0}")]
    InvalidPublicKey(usize),

    #[error("invalid threshold {threshold} for {shares} shares")]
    InvalidThreshold { threshold: usize, shares: usize },

    #[error("random generator failure: {0}")]
    Random(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
