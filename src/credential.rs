//! Organization-issued bearer credentials and their embedded claims.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::rendezvous::RendezvousPointRef;

/// Claims embedded in a credential token. All timestamps are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Issuing organization.
    pub org: String,
    #[serde(rename = "iat")]
    pub issued_at: u64,
    #[serde(rename = "exp")]
    pub expires_at: u64,
}

/// An opaque signed membership token issued by a rendezvous point.
///
/// Claims are decoded once at construction; an unreadable payload leaves them
/// empty but the token remains a valid bearer token. The raw token never
/// leaves this module except as an `Authorization` header value.
#[derive(Clone)]
pub struct Credential {
    issuer: RendezvousPointRef,
    raw: String,
    claims: Option<Claims>,
}

impl Credential {
    pub fn new(issuer: RendezvousPointRef, raw: String) -> Self {
        let claims = decode_claims(&raw);
        Self { issuer, raw, claims }
    }

    pub fn issuer(&self) -> &RendezvousPointRef {
        &self.issuer
    }

    /// Decoded claims, if the token carried a readable payload.
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    /// Value for the `Authorization` header when spending this credential.
    pub fn authorization_header_value(&self) -> String {
        format!("Bearer {}", self.raw)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("issuer", &self.issuer)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

/// Best-effort decode of the token's middle segment as base64url JSON.
///
/// Any malformation (wrong segment count, bad base64, bad JSON) yields `None`
/// rather than an error; trust in the signature stays with the server that
/// accepts the bearer token.
fn decode_claims(raw: &str) -> Option<Claims> {
    let mut segments = raw.split('.');
    let payload = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The single organization shared by every decodable credential, if any.
pub fn common_organization(credentials: &[Credential]) -> Option<&str> {
    let mut orgs = credentials
        .iter()
        .filter_map(|c| c.claims())
        .map(|claims| claims.org.as_str());
    let first = orgs.next()?;
    orgs.all(|org| org == first).then_some(first)
}

/// The earliest expiry among the decodable credentials, epoch seconds.
pub fn soonest_expiration(credentials: &[Credential]) -> Option<u64> {
    credentials
        .iter()
        .filter_map(|c| c.claims())
        .map(|claims| claims.expires_at)
        .min()
}
