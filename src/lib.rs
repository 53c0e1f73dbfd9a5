//! Protocol and cryptography engine for anonymous disclosure delivery over
//! independent rendezvous points.
//!
//! A disclosure is encrypted to a recipient, split into verifiable threshold
//! shares, and fanned out so that no single server ever holds enough to read
//! it; the recipient polls every point and reconstructs once a full share set
//! has arrived. All traffic is domain-fronted so network observers see only
//! common CDN hostnames, never the true destinations.

pub mod constants;
pub mod coordinator;
pub mod credential;
pub mod crypto;
pub mod disclosure;
pub mod encoding;
pub mod error;
pub mod fronting;
pub mod recipient;
pub mod rendezvous;
pub mod traits;

// Re-export core types
pub use coordinator::Coordinator;
pub use credential::{Claims, Credential};
pub use disclosure::{Disclosure, EncryptedDisclosure, VerifiableShare};
pub use error::{RendezvousError, Result};
pub use fronting::FrontedClient;
pub use recipient::{Recipient, RecipientKey};
pub use rendezvous::{RendezvousPoint, RendezvousPointRef};
