//! Domain-fronting request transform.
//!
//! The visible connection target (TLS SNI, TCP endpoint) becomes a common CDN
//! hostname while the encrypted `Host` header carries the true destination,
//! letting the CDN route the request on the far side of the handshake. An
//! observer on the wire sees only the fronting hostname.

use rand::seq::SliceRandom;
use reqwest::header::HOST;
use reqwest::{Client, Request, Response};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request URL carries no host")]
    MissingHost,

    #[error("fronting base {0} cannot replace the connection target")]
    InvalidFrontingBase(String),
}

/// Common domains that share a CDN edge with Google properties.
const GOOGLE_FRONTING_BASES: [&str; 4] = [
    "https://ww.google.com",
    "https://android.clients.google.com",
    "https://clients3.google.com",
    "https://clients4.google.com",
];

/// Rewrite `request` to connect to `fronting_base` while still addressing the
/// true destination through the `Host` header.
///
/// The original path and query are preserved; only scheme, host and port come
/// from the fronting base.
pub fn wrap(request: &mut Request, fronting_base: &Url) -> Result<(), TransportError> {
    let destination = request
        .url()
        .host_str()
        .ok_or(TransportError::MissingHost)?
        .to_string();

    let base = fronting_base.as_str().to_string();
    let url = request.url_mut();
    url.set_scheme(fronting_base.scheme())
        .map_err(|_| TransportError::InvalidFrontingBase(base.clone()))?;
    url.set_host(fronting_base.host_str())
        .map_err(|_| TransportError::InvalidFrontingBase(base.clone()))?;
    url.set_port(fronting_base.port())
        .map_err(|_| TransportError::InvalidFrontingBase(base))?;

    let host_value = destination
        .parse()
        .map_err(|_| TransportError::MissingHost)?;
    request.headers_mut().insert(HOST, host_value);
    Ok(())
}

/// Wrap with a fronting base chosen uniformly at random on every call, so no
/// single front can be blocklisted into correlating a client's whole session.
pub fn wrap_google_fronted(request: &mut Request) -> Result<(), TransportError> {
    let base = GOOGLE_FRONTING_BASES
        .choose(&mut rand::thread_rng())
        .expect("fronting pool is non-empty");
    let base = Url::parse(base).expect("fronting pool entries are valid URLs");
    wrap(request, &base)
}

/// An HTTP client that fronts every request it executes.
#[derive(Clone, Default)]
pub struct FrontedClient {
    http: Client,
}

impl FrontedClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Execute `request` through a randomly chosen front.
    pub async fn execute(&self, mut request: Request) -> Result<Response, TransportError> {
        wrap_google_fronted(&mut request)?;
        debug!(method = %request.method(), url = %request.url(), "sending fronted request");
        Ok(self.http.execute(request).await?)
    }

    /// The underlying client, for building requests against true destinations.
    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}
