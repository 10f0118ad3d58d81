//! Broker and consumer URI resolution, including the session bootstrap exchange

use fhttp_common::constants::{ALLOWED_BROKER_SCHEMES, NEW_SESSION_SENTINEL};
use fhttp_common::validation::{needs_new_session, request_target, session_hash_from_path};
use fhttp_common::{Envelope, HelloMessage, MessageKind, RequestTarget, Result, TunnelError};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// The resolved, ready-to-dial tunnel endpoint (`ws://` or `wss://`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEndpoint {
    url: Url,
}

impl SessionEndpoint {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Session hash encoded in the endpoint path
    pub fn hash(&self) -> Option<&str> {
        session_hash_from_path(self.url.path()).ok().flatten()
    }
}

impl fmt::Display for SessionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Base URI of the local service receiving forwarded requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerEndpoint {
    base: Url,
}

impl ConsumerEndpoint {
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Copy of the base with its path and query replaced by `target`
    pub fn scoped(&self, target: &RequestTarget) -> Url {
        let mut url = self.base.clone();
        target.apply_to(&mut url);
        url
    }
}

impl fmt::Display for ConsumerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())
    }
}

/// Parse the consumer URI, applying `port` when the URI has no explicit port
pub fn resolve_consumer(raw_uri: &str, port: Option<u16>) -> Result<ConsumerEndpoint> {
    let mut base = Url::parse(raw_uri)?;

    if let Some(port) = port.filter(|port| *port > 0)
        && !has_explicit_port(raw_uri)
    {
        base.set_port(Some(port))
            .map_err(|_| TunnelError::InvalidUri(format!("{raw_uri} cannot carry a port")))?;
    }

    Ok(ConsumerEndpoint { base })
}

/// Whether the authority in `raw_uri` spells out a port. `Url::port` hides ports equal to
/// the scheme default, so `http://host:80` has to be read from the text.
fn has_explicit_port(raw_uri: &str) -> bool {
    let Some((_, rest)) = raw_uri.split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    match host_port.rfind(']') {
        Some(end) => host_port[end..].contains(':'),
        None => host_port.contains(':'),
    }
}

/// Resolves the operator's broker URI into a tunnel endpoint
pub struct UriResolver {
    http: Client,
}

impl UriResolver {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TunnelError::ConnectionError(e.to_string()))?;
        Ok(Self { http })
    }

    /// Validate the broker URI, bootstrap a session if it has no usable hash, and switch
    /// it to the WebSocket scheme
    pub async fn resolve_broker(&self, raw_uri: &str) -> Result<SessionEndpoint> {
        let mut url = Url::parse(raw_uri)?;

        if !ALLOWED_BROKER_SCHEMES.contains(&url.scheme()) {
            return Err(TunnelError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
                allowed: ALLOWED_BROKER_SCHEMES.join(","),
            });
        }

        url.set_fragment(None);

        let hash = session_hash_from_path(url.path())?;
        if needs_new_session(hash) {
            url = self.fetch_new_session(url).await?;
        }

        to_tunnel_scheme(&mut url)?;
        Ok(SessionEndpoint { url })
    }

    /// Ask the broker for a fresh session and return `uri` with the session path
    pub async fn fetch_new_session(&self, mut uri: Url) -> Result<Url> {
        uri.set_path(NEW_SESSION_SENTINEL);
        debug!("requesting new session from {}", uri);

        let response = self
            .http
            .post(uri.clone())
            .send()
            .await
            .map_err(|e| TunnelError::BootstrapFailed {
                status: "no response".to_string(),
                body: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TunnelError::BootstrapFailed {
                status: status.to_string(),
                body: format!("unable to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(TunnelError::BootstrapFailed {
                status: status.to_string(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let envelope = Envelope::from_slice(&body)?;
        if envelope.kind != MessageKind::Hello {
            return Err(TunnelError::UnexpectedMessageKind(envelope.kind.to_string()));
        }

        let hello: HelloMessage = envelope.decode_payload()?;
        if needs_new_session(Some(&hello.hash)) {
            return Err(TunnelError::InvalidSessionHash(hello.hash));
        }

        let tunnel = uri.join(hello.tunnel_uri())?;
        request_target(&tunnel).apply_to(&mut uri);

        debug!(hash = %hello.hash, "received new session");
        Ok(uri)
    }
}

fn to_tunnel_scheme(url: &mut Url) -> Result<()> {
    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(TunnelError::UnsupportedScheme {
                scheme: other.to_string(),
                allowed: ALLOWED_BROKER_SCHEMES.join(","),
            });
        }
    };

    url.set_scheme(scheme)
        .map_err(|_| TunnelError::InvalidUri(format!("cannot switch {url} to {scheme}")))
}
