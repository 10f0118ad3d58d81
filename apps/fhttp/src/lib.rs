//! Forward HTTP (FHttp) client
//!
//! Opens a persistent WebSocket to an FHttp broker, receives descriptors of inbound HTTP
//! requests and replays each one against a local consumer service.
//!
//! Startup resolves the broker URI (bootstrapping a session when needed), dials the
//! tunnel and spawns the single reader task. The main loop then waits for the reader to
//! stop, the keepalive timer, or the operator interrupt.

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod forwarder;
pub mod logging;
pub mod output;
pub mod resolver;
pub mod shutdown;

#[cfg(test)]
mod test_support;

pub use config::{Args, Config, SessionConfig};
pub use output::{ConsoleOutput, OperatorOutput};
pub use shutdown::{ReaderExit, Termination};

use connection::Connection;
use dispatcher::Dispatcher;
use forwarder::Forwarder;
use resolver::{UriResolver, resolve_consumer};
use shutdown::{run_session, spawn_reader};

/// Run one session from URI resolution to termination
///
/// Every error returned here is fatal to the run.
pub async fn run<F>(config: Config, output: Arc<dyn OperatorOutput>, interrupt: F) -> Result<Termination>
where
    F: Future<Output = ()>,
{
    let resolver = UriResolver::new(config.http_timeout)?;
    let broker = resolver
        .resolve_broker(&config.broker_uri)
        .await
        .context("failed to resolve broker uri")?;

    let consumer = resolve_consumer(&config.consumer_uri, config.consumer_port)
        .context("failed to parse consumer uri")?;

    debug!(hash = ?broker.hash(), "connecting to {}", broker);
    let (connection, reader) = Connection::dial(&broker, config.session.keepalive_timeout).await?;

    let forwarder = Forwarder::new(consumer, output.clone(), config.http_timeout)?;
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(forwarder), output));
    let done = spawn_reader(reader, dispatcher);

    let termination = run_session(&connection, done, interrupt, &config.session).await?;
    Ok(termination)
}
