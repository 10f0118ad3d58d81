//! Per-frame decoding and routing of broker messages

use fhttp_common::{ConsumerMessage, Envelope, HelloMessage, MessageKind};
use serde::de::IgnoredAny;
use std::sync::Arc;
use tracing::{debug, error};

use crate::forwarder::Forwarder;
use crate::output::OperatorOutput;
use crate::shutdown::InflightTasks;

/// What happened to a single inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not valid JSON; dropped without logging
    Discarded,
    /// Envelope or payload failed to decode; logged and dropped
    Dropped,
    Ping,
    Hello,
    /// A forwarding task was registered and spawned
    Forwarding,
    /// Unknown message kind
    Ignored,
}

pub struct Dispatcher {
    forwarder: Arc<Forwarder>,
    output: Arc<dyn OperatorOutput>,
    inflight: InflightTasks,
}

impl Dispatcher {
    pub fn new(forwarder: Arc<Forwarder>, output: Arc<dyn OperatorOutput>) -> Self {
        Self {
            forwarder,
            output,
            inflight: InflightTasks::default(),
        }
    }

    pub fn inflight(&self) -> &InflightTasks {
        &self.inflight
    }

    /// Decode and route one frame. Only consumer messages leave the caller's task;
    /// everything else is handled inline.
    pub fn dispatch(&self, frame: &[u8]) -> Dispatch {
        if serde_json::from_slice::<IgnoredAny>(frame).is_err() {
            return Dispatch::Discarded;
        }

        let envelope = match Envelope::from_slice(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(error = %e, "failed to decode message");
                return Dispatch::Dropped;
            }
        };

        match envelope.kind {
            MessageKind::Ping => Dispatch::Ping,
            MessageKind::Hello => match envelope.decode_payload::<HelloMessage>() {
                Ok(hello) => {
                    self.output
                        .session_started(&hello, self.forwarder.consumer().base());
                    Dispatch::Hello
                }
                Err(e) => {
                    error!(error = %e, "failed to decode hello message");
                    Dispatch::Dropped
                }
            },
            MessageKind::ConsumerMessage => match envelope.decode_payload::<ConsumerMessage>() {
                Ok(request) => {
                    debug!("Received consumer message: {} {}", request.method, request.route);
                    let forwarder = self.forwarder.clone();
                    self.inflight
                        .spawn(async move { forwarder.handle(request).await });
                    Dispatch::Forwarding
                }
                Err(e) => {
                    error!(error = %e, "failed to decode consumer message");
                    Dispatch::Dropped
                }
            },
            MessageKind::Unknown => {
                debug!("Ignoring message of unknown type");
                Dispatch::Ignored
            }
        }
    }
}
