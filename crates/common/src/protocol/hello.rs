use serde::{Deserialize, Serialize};

/// Session initialisation data sent by the broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    /// Broker-assigned session hash
    pub hash: String,

    /// Public URL the broker exposes for this session
    pub request_uri: String,

    /// Tunnel endpoint the client should open, when it differs from `request_uri`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_uri: Option<String>,
}

impl HelloMessage {
    /// URI whose request-target becomes the tunnel path after bootstrap
    pub fn tunnel_uri(&self) -> &str {
        self.open_uri.as_deref().unwrap_or(&self.request_uri)
    }
}
