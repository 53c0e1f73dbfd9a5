use thiserror::Error;

use crate::crypto::sharing::ReconstructionError;
use crate::crypto::CryptoError;
use crate::fronting::TransportError;

#[derive(Error, Debug)]
pub enum RendezvousError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Reconstruction error: {0}")]
    Reconstruction(#[from] ReconstructionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("expected one credential per rendezvous point ({expected}), got {got}")]
    CredentialCountMismatch { expected: usize, got: usize },
}

impl From<reqwest::Error> for RendezvousError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(TransportError::Http(err))
    }
}

pub type Result<T> = std::result::Result<T, RendezvousError>;
