//! The single persistent WebSocket connection to the broker
//!
//! Dialing yields a [`Connection`] that owns the write half and a [`FrameReader`] for the
//! one reader task. All writes go through one mutex so that keepalive and close never
//! interleave, whatever runtime flavour drives them. [`Connection::close`] also ends the
//! reader stream, so the socket is released once the reader task lets go of it.

use fhttp_common::{Envelope, Result, TunnelError};
use futures_util::stream::{AbortHandle, Abortable, SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message as WsMessage,
};
use tracing::debug;

use crate::resolver::SessionEndpoint;

type WebSocket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Read half of the broker connection
pub type FrameReader = Abortable<SplitStream<WebSocket>>;

pub struct Connection {
    writer: Arc<Mutex<SplitSink<WebSocket, WsMessage>>>,
    write_timeout: Duration,
    reader_abort: AbortHandle,
}

impl Connection {
    /// Open the tunnel. `write_timeout` bounds each keepalive write.
    pub async fn dial(
        endpoint: &SessionEndpoint,
        write_timeout: Duration,
    ) -> Result<(Self, FrameReader)> {
        debug!("Dialing {}", endpoint);

        let (ws_stream, _) = connect_async(endpoint.as_str())
            .await
            .map_err(|e| TunnelError::ConnectionError(format!("failed to dial broker: {e}")))?;

        let (write, read) = ws_stream.split();
        let (reader_abort, registration) = AbortHandle::new_pair();
        let connection = Self {
            writer: Arc::new(Mutex::new(write)),
            write_timeout,
            reader_abort,
        };

        Ok((connection, Abortable::new(read, registration)))
    }

    /// Send a Ping envelope as a WebSocket ping frame
    pub async fn send_ping(&self) -> Result<()> {
        let data = Envelope::ping().to_vec()?;

        let mut writer = self.writer.lock().await;
        tokio::time::timeout(self.write_timeout, writer.send(WsMessage::Ping(data.into())))
            .await
            .map_err(|_| TunnelError::Timeout("keepalive write"))?
            .map_err(|e| TunnelError::WebSocketError(format!("failed to write ping message: {e}")))
    }

    /// Start the close handshake with a normal-closure frame
    pub async fn send_control_close(&self) -> Result<()> {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: String::new().into(),
        };

        let mut writer = self.writer.lock().await;
        writer.send(WsMessage::Close(Some(frame))).await.map_err(|e| {
            TunnelError::WebSocketError(format!("failed to write socket close message: {e}"))
        })
    }

    /// Close the transport. A connection the peer already tore down counts as closed.
    ///
    /// The reader stream ends right after, whether or not the peer answered the close.
    pub async fn close(&self) -> Result<()> {
        let mut writer = self.writer.lock().await;
        let closed = writer.close().await;
        self.reader_abort.abort();

        match closed {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(WsError::Io(e))
                if matches!(e.kind(), ErrorKind::BrokenPipe | ErrorKind::ConnectionReset) =>
            {
                Ok(())
            }
            Err(e) => Err(TunnelError::WebSocketError(format!(
                "failed to close connection: {e}"
            ))),
        }
    }
}
