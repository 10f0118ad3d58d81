//! Reader loop, in-flight tracking and the main select loop that sequences shutdown
//!
//! The reader is the only consumer of the transport's read half. When it stops, for any
//! reason, it waits for every in-flight forward before firing the done signal. The main
//! loop waits on that signal, the keepalive timer and the operator interrupt.

use fhttp_common::Result;
use futures_util::{Stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::config::SessionConfig;
use crate::connection::Connection;
use crate::dispatcher::Dispatcher;

/// Forwards currently executing; shutdown waits for this to reach zero
#[derive(Debug, Clone, Default)]
pub struct InflightTasks {
    tracker: TaskTracker,
}

impl InflightTasks {
    /// Register and start a task
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Wait until every registered task has finished
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Why the reader stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderExit {
    /// Peer sent a normal-closure frame
    PeerClosed,
    /// Peer closed with any other code
    Closed { code: u16, reason: String },
    /// Transport read error
    Error(String),
    /// Stream ended without a close frame
    EndOfStream,
}

/// How the session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    ReaderStopped(ReaderExit),
    Interrupted,
}

/// Spawn the reader task. The returned receiver fires once, after in-flight forwards
/// have drained.
pub fn spawn_reader<S>(reader: S, dispatcher: Arc<Dispatcher>) -> oneshot::Receiver<ReaderExit>
where
    S: Stream<Item = std::result::Result<WsMessage, WsError>> + Unpin + Send + 'static,
{
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        let exit = read_frames(reader, &dispatcher).await;

        debug!("Reader loop has been stopped, waiting for any in-flight requests to complete");
        dispatcher.inflight().drain().await;

        let _ = done_tx.send(exit);
    });

    done_rx
}

async fn read_frames<S>(mut reader: S, dispatcher: &Dispatcher) -> ReaderExit
where
    S: Stream<Item = std::result::Result<WsMessage, WsError>> + Unpin,
{
    while let Some(message) = reader.next().await {
        match message {
            Ok(WsMessage::Text(text)) => {
                dispatcher.dispatch(text.as_bytes());
            }
            Ok(WsMessage::Binary(data)) => {
                dispatcher.dispatch(&data);
            }
            Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) | Ok(WsMessage::Frame(_)) => {}
            Ok(WsMessage::Close(Some(frame))) if frame.code == CloseCode::Normal => {
                return ReaderExit::PeerClosed;
            }
            Ok(WsMessage::Close(frame)) => {
                let (code, reason) = frame
                    .map(|f| (u16::from(f.code), f.reason.to_string()))
                    .unwrap_or((u16::from(CloseCode::Status), String::new()));
                error!(code, reason = %reason, "Read Error: connection closed by broker");
                return ReaderExit::Closed { code, reason };
            }
            Err(e) => {
                error!(error = %e, "Read Error");
                return ReaderExit::Error(e.to_string());
            }
        }
    }

    error!("Read Error: connection ended without a close frame");
    ReaderExit::EndOfStream
}

/// Drive the session until the reader stops or the operator interrupts
///
/// Keepalive and close-write failures are returned as errors.
pub async fn run_session<F>(
    connection: &Connection,
    mut done: oneshot::Receiver<ReaderExit>,
    interrupt: F,
    config: &SessionConfig,
) -> Result<Termination>
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval_at(
        Instant::now() + config.keepalive_interval,
        config.keepalive_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            biased;

            _ = &mut interrupt => {
                info!("Initializing FHttp client shutdown per user request");
                connection.send_control_close().await?;
                tokio::time::sleep(config.close_grace_period).await;
                connection.close().await?;
                return Ok(Termination::Interrupted);
            }
            exit = &mut done => {
                let exit = exit.unwrap_or_else(|_| {
                    ReaderExit::Error("reader task ended without reporting".to_string())
                });
                return Ok(Termination::ReaderStopped(exit));
            }
            _ = ticker.tick() => {
                connection.send_ping().await?;
                debug!("Sent keepalive ping");
            }
        }
    }
}
