//! HTTP client for a single rendezvous point.
//!
//! Every request goes through the domain-fronting transport. Failures never
//! cross the client boundary: operations resolve to `None`/`false`/empty and
//! log the cause at debug level, leaving aggregation policy to the
//! coordinator.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use uuid::Uuid;
use x25519_dalek::PublicKey;
use zeroize::Zeroize;

use crate::constants::DEFAULT_RENDEZVOUS_POINTS;
use crate::credential::Credential;
use crate::crypto::{aead, agreement};
use crate::disclosure::VerifiableShare;
use crate::encoding;
use crate::error::Result;
use crate::fronting::{FrontedClient, TransportError};
use crate::recipient::{Recipient, RecipientKey};
use crate::traits::rendezvous::{InboxShares, RendezvousApi};

/// A configured rendezvous point. Stateless: just the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendezvousPointRef {
    pub url: Url,
}

impl RendezvousPointRef {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

/// Protocol client for one rendezvous point.
#[derive(Clone)]
pub struct RendezvousPoint {
    reference: RendezvousPointRef,
    client: FrontedClient,
}

/// Opaque bearer token proving possession of a recipient key for one
/// challenge.
#[derive(Debug, Clone)]
pub struct AuthToken(String);

impl AuthToken {
    fn header_value(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
struct CredentialResponse {
    credential: String,
}

#[derive(Deserialize)]
struct ChallengeResponse {
    #[serde(with = "encoding::b64")]
    token: Vec<u8>,
    #[serde(with = "encoding::b64")]
    nonce: Vec<u8>,
    #[serde(rename = "publicKey", with = "encoding::b64_key")]
    public_key: PublicKey,
}

#[derive(Serialize)]
struct ChallengeAuth {
    #[serde(rename = "encryptedToken", with = "encoding::b64")]
    encrypted_token: Vec<u8>,
    #[serde(with = "encoding::b64")]
    nonce: Vec<u8>,
}

#[derive(Deserialize)]
struct InboxItem {
    id: Uuid,
    org: String,
    share: VerifiableShare,
}

#[derive(Serialize)]
struct DiscloseRequest<'a> {
    id: Uuid,
    #[serde(with = "encoding::b64_key")]
    recipient: PublicKey,
    share: &'a VerifiableShare,
}

impl RendezvousPoint {
    pub fn new(reference: RendezvousPointRef, client: FrontedClient) -> Self {
        Self { reference, client }
    }

    /// The compiled-in rendezvous point set.
    pub fn all(client: &FrontedClient) -> Vec<Self> {
        DEFAULT_RENDEZVOUS_POINTS
            .iter()
            .map(|raw| Url::parse(raw).expect("compiled-in rendezvous point URLs are valid"))
            .map(|url| Self::new(RendezvousPointRef::new(url), client.clone()))
            .collect()
    }

    /// Rendezvous points from the `RENDEZVOUS_POINTS` environment variable
    /// (comma-separated base URLs), falling back to the compiled-in set.
    pub fn from_env(client: &FrontedClient) -> Vec<Self> {
        match std::env::var("RENDEZVOUS_POINTS") {
            Ok(raw) => raw
                .split(',')
                .filter_map(|entry| Url::parse(entry.trim()).ok())
                .map(|url| Self::new(RendezvousPointRef::new(url), client.clone()))
                .collect(),
            Err(_) => Self::all(client),
        }
    }

    pub fn reference(&self) -> &RendezvousPointRef {
        &self.reference
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, TransportError> {
        Ok(self.reference.url.join(path)?)
    }

    async fn try_request_credential(&self) -> Result<Credential> {
        let request = self.client.http().get(self.endpoint("credential")?).build()?;
        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::OK {
            return Err(TransportError::Status(response.status().as_u16()).into());
        }
        let body: CredentialResponse = response.json().await?;
        Ok(Credential::new(self.reference.clone(), body.credential))
    }

    async fn try_register_recipient(&self, recipient: &Recipient) -> Result<()> {
        let request = self
            .client
            .http()
            .post(self.endpoint("register")?)
            .json(recipient)
            .build()?;
        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::OK {
            return Err(TransportError::Status(response.status().as_u16()).into());
        }
        Ok(())
    }

    /// Two-step challenge-response inbox authentication.
    ///
    /// Sealing the server's challenge token under the agreed key proves
    /// possession of the recipient private key without revealing it; echoing
    /// the server-chosen nonce binds the proof to this challenge.
    async fn try_fetch_inbox_challenge(
        &self,
        recipient: &Recipient,
        key: &RecipientKey,
    ) -> Result<AuthToken> {
        let path = format!(
            "inbox/{}/challenge",
            encoding::url_safe_key(&recipient.public_key)
        );
        let request = self.client.http().get(self.endpoint(&path)?).build()?;
        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::OK {
            return Err(TransportError::Status(response.status().as_u16()).into());
        }
        let challenge: ChallengeResponse = response.json().await?;

        // The challenge verifier derives with no context label.
        let mut symmetric = agreement::agree_static(key.secret(), &challenge.public_key, &[])?;
        let sealed = aead::seal(&symmetric, &challenge.token);
        symmetric.zeroize();

        let auth = ChallengeAuth {
            encrypted_token: sealed?,
            nonce: challenge.nonce,
        };
        let encoded = serde_json::to_vec(&auth)?;
        Ok(AuthToken(format!("Bearer {}", STANDARD.encode(encoded))))
    }

    async fn try_check_inbox(
        &self,
        recipient: &Recipient,
        key: &RecipientKey,
    ) -> Result<InboxShares> {
        let token = self.try_fetch_inbox_challenge(recipient, key).await?;
        let path = format!("inbox/{}", encoding::url_safe_key(&recipient.public_key));
        let request = self
            .client
            .http()
            .get(self.endpoint(&path)?)
            .header(AUTHORIZATION, token.header_value())
            .build()?;
        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::OK {
            return Err(TransportError::Status(response.status().as_u16()).into());
        }
        let items: Vec<InboxItem> = response.json().await?;

        let mut shares: InboxShares = HashMap::new();
        for item in items {
            shares
                .entry(item.org)
                .or_default()
                .insert(item.id, item.share);
        }
        Ok(shares)
    }

    async fn try_delete_inbox_share(
        &self,
        disclosure_id: Uuid,
        recipient: &Recipient,
        key: &RecipientKey,
    ) -> Result<()> {
        let token = self.try_fetch_inbox_challenge(recipient, key).await?;
        let path = format!(
            "inbox/{}/{}",
            encoding::url_safe_key(&recipient.public_key),
            disclosure_id
        );
        let request = self
            .client
            .http()
            .delete(self.endpoint(&path)?)
            .header(AUTHORIZATION, token.header_value())
            .build()?;
        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::OK {
            return Err(TransportError::Status(response.status().as_u16()).into());
        }
        Ok(())
    }

    async fn try_request_recipients(&self) -> Result<Vec<Recipient>> {
        let request = self.client.http().get(self.endpoint("recipients")?).build()?;
        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::OK {
            return Err(TransportError::Status(response.status().as_u16()).into());
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RendezvousApi for RendezvousPoint {
    async fn request_credential(&self) -> Option<Credential> {
        match self.try_request_credential().await {
            Ok(credential) => Some(credential),
            Err(err) => {
                debug!(point = %self.reference.url, %err, "credential request failed");
                None
            }
        }
    }

    async fn register_recipient(&self, recipient: &Recipient) -> bool {
        match self.try_register_recipient(recipient).await {
            Ok(()) => true,
            Err(err) => {
                debug!(point = %self.reference.url, %err, "recipient registration failed");
                false
            }
        }
    }

    async fn check_inbox(&self, recipient: &Recipient, key: &RecipientKey) -> Option<InboxShares> {
        match self.try_check_inbox(recipient, key).await {
            Ok(shares) => Some(shares),
            Err(err) => {
                debug!(point = %self.reference.url, %err, "inbox check failed");
                None
            }
        }
    }

    async fn delete_inbox_share(
        &self,
        disclosure_id: Uuid,
        recipient: &Recipient,
        key: &RecipientKey,
    ) -> bool {
        match self
            .try_delete_inbox_share(disclosure_id, recipient, key)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                debug!(point = %self.reference.url, %err, "inbox share deletion failed");
                false
            }
        }
    }

    async fn submit_disclosure(
        &self,
        credential: &Credential,
        recipient: &Recipient,
        disclosure_id: Uuid,
        share: &VerifiableShare,
    ) -> std::result::Result<u16, TransportError> {
        let body = DiscloseRequest {
            id: disclosure_id,
            recipient: recipient.public_key,
            share,
        };
        let request = self
            .client
            .http()
            .post(self.endpoint("disclose")?)
            .header(AUTHORIZATION, credential.authorization_header_value())
            .json(&body)
            .build()?;
        let response = self.client.execute(request).await?;
        Ok(response.status().as_u16())
    }

    async fn request_recipients(&self) -> Vec<Recipient> {
        match self.try_request_recipients().await {
            Ok(recipients) => recipients,
            Err(err) => {
                debug!(point = %self.reference.url, %err, "recipient listing failed");
                Vec::new()
            }
        }
    }
}
