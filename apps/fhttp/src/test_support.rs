//! Test doubles: a recording operator output and an in-process WebSocket broker

use fhttp_common::HelloMessage;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use url::Url;

use crate::forwarder::ForwardOutcome;
use crate::output::OperatorOutput;
use crate::resolver::{SessionEndpoint, UriResolver};

#[derive(Default)]
pub struct RecordingOutput {
    sessions: Mutex<Vec<(HelloMessage, Url)>>,
    forwarded: Mutex<Vec<ForwardOutcome>>,
}

impl RecordingOutput {
    pub fn sessions(&self) -> Vec<(HelloMessage, Url)> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn forwarded(&self) -> Vec<ForwardOutcome> {
        self.forwarded.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty() && self.forwarded().is_empty()
    }
}

impl OperatorOutput for RecordingOutput {
    fn session_started(&self, hello: &HelloMessage, consumer: &Url) {
        self.sessions
            .lock()
            .unwrap()
            .push((hello.clone(), consumer.clone()));
    }

    fn request_forwarded(&self, outcome: &ForwardOutcome) {
        self.forwarded.lock().unwrap().push(outcome.clone());
    }
}

/// Resolve an `http://` URI that already carries a valid session hash
pub async fn endpoint(raw: &str) -> SessionEndpoint {
    UriResolver::new(Duration::from_secs(5))
        .unwrap()
        .resolve_broker(raw)
        .await
        .unwrap()
}

/// Accepts a single WebSocket client, records every message it receives and sends
/// whatever the test queues
pub struct MockBroker {
    addr: SocketAddr,
    received: mpsc::UnboundedReceiver<WsMessage>,
    outgoing: mpsc::UnboundedSender<WsMessage>,
}

impl MockBroker {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (received_tx, received) = mpsc::unbounded_channel();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<WsMessage>();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws_stream = accept_async(stream).await.unwrap();
            let (mut write, mut read) = ws_stream.split();

            loop {
                tokio::select! {
                    message = read.next() => match message {
                        Some(Ok(message)) => {
                            let _ = received_tx.send(message);
                        }
                        _ => break,
                    },
                    Some(message) = outgoing_rx.recv() => {
                        if write.send(message).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            addr,
            received,
            outgoing,
        }
    }

    pub async fn endpoint(&self) -> SessionEndpoint {
        endpoint(&format!("http://{}/open/AbCdEfGhIj", self.addr)).await
    }

    pub fn send(&self, message: WsMessage) {
        self.outgoing.send(message).unwrap();
    }

    /// Next message from the client, `None` once the connection is gone
    pub async fn next_received(&mut self) -> Option<WsMessage> {
        tokio::time::timeout(Duration::from_secs(5), self.received.recv())
            .await
            .ok()
            .flatten()
    }

    /// Every message received until the client disconnects
    pub async fn drain_received(&mut self) -> Vec<WsMessage> {
        let mut messages = Vec::new();
        while let Some(message) = self.next_received().await {
            messages.push(message);
        }
        messages
    }
}
