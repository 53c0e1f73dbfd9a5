use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::credential::Credential;
use crate::disclosure::VerifiableShare;
use crate::fronting::TransportError;
use crate::recipient::{Recipient, RecipientKey};

/// Shares held for a recipient at one rendezvous point, grouped by
/// organization and then by disclosure id.
pub type InboxShares = HashMap<String, HashMap<Uuid, VerifiableShare>>;

/// The per-rendezvous-point operation surface.
///
/// Implementations isolate their own failures: operations resolve to
/// `None`/`false`/empty rather than erroring, so the coordinator's fan-in
/// stays a pure aggregation over partial results. Submission alone returns
/// the raw status, which the coordinator inspects for its all-or-nothing
/// decision.
#[async_trait]
pub trait RendezvousApi {
    /// Ask this point's credential service for a membership token.
    async fn request_credential(&self) -> Option<Credential>;

    /// Register a recipient so senders can discover it here.
    async fn register_recipient(&self, recipient: &Recipient) -> bool;

    /// List and group the shares waiting for `recipient`.
    async fn check_inbox(&self, recipient: &Recipient, key: &RecipientKey) -> Option<InboxShares>;

    /// Delete one disclosure's share from the recipient's inbox.
    async fn delete_inbox_share(
        &self,
        disclosure_id: Uuid,
        recipient: &Recipient,
        key: &RecipientKey,
    ) -> bool;

    /// Submit one share of a disclosure, spending `credential`.
    async fn submit_disclosure(
        &self,
        credential: &Credential,
        recipient: &Recipient,
        disclosure_id: Uuid,
        share: &VerifiableShare,
    ) -> Result<u16, TransportError>;

    /// List the recipients registered with this point.
    async fn request_recipients(&self) -> Vec<Recipient>;
}
