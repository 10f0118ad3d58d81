use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ConsumerMessage, HelloMessage};
use crate::error::Result;

/// Discriminant of an [`Envelope`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Keepalive, carries no payload
    Ping,
    /// Session initialisation
    Hello,
    /// An HTTP request to replay against the consumer
    ConsumerMessage,
    /// Any kind this client does not know about
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MessageKind::Ping => "ping",
            MessageKind::Hello => "hello",
            MessageKind::ConsumerMessage => "consumer_message",
            MessageKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// All broker messages are wrapped in this envelope; the payload is decoded once the
/// kind is known
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: MessageKind,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub message: Value,
}

impl Envelope {
    pub fn ping() -> Self {
        Self {
            kind: MessageKind::Ping,
            message: Value::Null,
        }
    }

    pub fn hello(hello: &HelloMessage) -> Result<Self> {
        Ok(Self {
            kind: MessageKind::Hello,
            message: serde_json::to_value(hello)?,
        })
    }

    pub fn consumer(request: &ConsumerMessage) -> Result<Self> {
        Ok(Self {
            kind: MessageKind::ConsumerMessage,
            message: serde_json::to_value(request)?,
        })
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode the kind-specific payload
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.message)?)
    }
}
