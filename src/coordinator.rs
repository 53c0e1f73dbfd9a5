//! Fan-out/fan-in across the configured rendezvous point set.
//!
//! Each operation spawns one future per point and joins all of them before
//! aggregating: a failed point contributes "no result" to its slot, nothing
//! is retried, and nothing short-circuits even when enough information exists
//! to decide the outcome early. Timeouts are the transport's concern.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::credential::Credential;
use crate::disclosure::{Disclosure, EncryptedDisclosure, VerifiableShare};
use crate::error::{RendezvousError, Result};
use crate::recipient::{Recipient, RecipientKey};
use crate::traits::rendezvous::RendezvousApi;

/// Coordinates one logical operation across every rendezvous point.
pub struct Coordinator<P> {
    points: Vec<P>,
}

impl<P: RendezvousApi + Sync> Coordinator<P> {
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// Collect credentials from every point that will issue one.
    ///
    /// Partial success is acceptable; callers decide whether the collected
    /// set is usable (e.g. via [`crate::credential::common_organization`]).
    pub async fn request_credentials(&self) -> Vec<Credential> {
        join_all(self.points.iter().map(|point| point.request_credential()))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Register `recipient` with every point.
    ///
    /// True only if all succeeded: a recipient must be discoverable
    /// everywhere to receive full share sets later.
    pub async fn register_recipient(&self, recipient: &Recipient) -> bool {
        join_all(
            self.points
                .iter()
                .map(|point| point.register_recipient(recipient)),
        )
        .await
        .into_iter()
        .all(|ok| ok)
    }

    /// Recipients registered with every configured point.
    ///
    /// The first point's list is the candidate set; a candidate survives if
    /// every other list contains it (public-key equality).
    pub async fn request_common_recipients(&self) -> Vec<Recipient> {
        let mut sets = join_all(self.points.iter().map(|point| point.request_recipients())).await;
        if sets.is_empty() {
            return Vec::new();
        }
        let candidates = sets.remove(0);
        candidates
            .into_iter()
            .filter(|candidate| sets.iter().all(|set| set.contains(candidate)))
            .collect()
    }

    /// Submit one share of `disclosure` to each credential's point.
    ///
    /// `credentials` must hold exactly one credential per configured point, in
    /// point order; shares are paired positionally. The split requires every
    /// share for reconstruction, so delivery is all-or-nothing: true only if
    /// every point returned 200 with no transport error.
    pub async fn submit_disclosure(
        &self,
        credentials: &[Credential],
        disclosure: &Disclosure,
        recipient: &Recipient,
    ) -> Result<bool> {
        if credentials.len() != self.points.len() {
            return Err(RendezvousError::CredentialCountMismatch {
                expected: self.points.len(),
                got: credentials.len(),
            });
        }

        // TODO: pass a caller-chosen threshold once the submission flow can
        // route around unavailable points.
        let shares = disclosure.encrypt_and_split(recipient, credentials.len(), credentials.len())?;

        let submissions = self
            .points
            .iter()
            .zip(credentials.iter().zip(shares.iter()))
            .map(|(point, (credential, share))| {
                point.submit_disclosure(credential, recipient, disclosure.id, share)
            });

        Ok(join_all(submissions)
            .await
            .into_iter()
            .all(|outcome| matches!(outcome, Ok(200))))
    }

    /// Poll every inbox and reconstruct the disclosures with a full share set.
    ///
    /// Shares are merged by organization and disclosure id, appending
    /// duplicates. A share that fails commitment verification is treated as if
    /// its point had returned nothing. Groups below the full point count are
    /// skipped silently, since they may complete on a future poll. Reconstructed
    /// disclosures get their shares deleted best-effort from every point.
    pub async fn check_inbox(&self, recipient: &Recipient, key: &RecipientKey) -> Vec<Disclosure> {
        let results = join_all(
            self.points
                .iter()
                .map(|point| point.check_inbox(recipient, key)),
        )
        .await;

        let mut collected: HashMap<String, HashMap<Uuid, Vec<VerifiableShare>>> = HashMap::new();
        for shares in results.into_iter().flatten() {
            for (org, by_id) in shares {
                let org_entry = collected.entry(org).or_default();
                for (id, share) in by_id {
                    org_entry.entry(id).or_default().push(share);
                }
            }
        }

        let mut disclosures = Vec::new();
        for (org, by_id) in collected {
            for (id, shares) in by_id {
                let verified: Vec<VerifiableShare> = shares
                    .into_iter()
                    .filter(|share| share.verify(id, key))
                    .collect();
                if verified.len() < self.points.len() {
                    debug!(%id, have = verified.len(), need = self.points.len(),
                        "incomplete share set, waiting for next poll");
                    continue;
                }

                let encrypted = match EncryptedDisclosure::reconstruct(&verified) {
                    Ok(encrypted) => encrypted,
                    Err(err) => {
                        debug!(%id, %err, "reconstruction failed");
                        continue;
                    }
                };
                let mut disclosure = match encrypted.decrypt(key, &verified[0].ephemeral_key) {
                    Ok(disclosure) => disclosure,
                    Err(err) => {
                        debug!(%id, %err, "decryption failed");
                        continue;
                    }
                };
                disclosure.organization = Some(org.clone());
                disclosures.push(disclosure);

                if !self.delete_disclosure(id, recipient, key).await {
                    warn!(%id, "failed to delete shares of a reconstructed disclosure");
                }
            }
        }
        disclosures
    }

    /// Delete a disclosure's share from every point; true only if all
    /// succeeded.
    pub async fn delete_disclosure(
        &self,
        disclosure_id: Uuid,
        recipient: &Recipient,
        key: &RecipientKey,
    ) -> bool {
        join_all(
            self.points
                .iter()
                .map(|point| point.delete_inbox_share(disclosure_id, recipient, key)),
        )
        .await
        .into_iter()
        .all(|ok| ok)
    }
}
