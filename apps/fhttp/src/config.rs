//! Command-line arguments and the engine configuration derived from them

use clap::Parser;
use fhttp_common::constants::{
    CLOSE_GRACE_PERIOD_MS, DEFAULT_BROKER_URI, DEFAULT_CONSUMER_URI, HTTP_TIMEOUT_SECS,
    KEEPALIVE_INTERVAL_SECS, KEEPALIVE_WRITE_TIMEOUT_SECS,
};
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments for the fhttp client
#[derive(Parser, Debug)]
#[command(name = "fhttp")]
#[command(
    about = "A CLI for receiving FHttp broker payloads",
    long_about = "Establishes a WebSocket with an FHttp broker and listens for messages that \
                  are forwarded to a local consumer"
)]
#[command(version)]
pub struct Args {
    /// URL of the message broker to connect to. Must be a valid HTTP(S) URI
    #[arg(long, env = "FHTTP_BROKER", default_value = DEFAULT_BROKER_URI)]
    pub broker: String,

    /// URL of the consumer that payloads are forwarded to
    #[arg(long, env = "FHTTP_CONSUMER", default_value = DEFAULT_CONSUMER_URI)]
    pub consumer: String,

    /// Consumer port, used when the consumer URL has none
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable debug logs
    #[arg(short, long)]
    pub debug: bool,

    /// Also write error and info logs to hourly files in this directory
    #[arg(long, env = "FHTTP_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Configuration for the client
#[derive(Debug, Clone)]
pub struct Config {
    /// Broker URI as supplied by the operator
    pub broker_uri: String,

    /// Consumer URI as supplied by the operator
    pub consumer_uri: String,

    /// Port applied to the consumer URI when it carries none
    pub consumer_port: Option<u16>,

    pub debug: bool,

    pub log_dir: Option<PathBuf>,

    /// Timeout for the bootstrap exchange and for each forwarded request
    pub http_timeout: Duration,

    pub session: SessionConfig,
}

/// Timing of the connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub keepalive_interval: Duration,
    pub keepalive_timeout: Duration,
    pub close_grace_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(KEEPALIVE_INTERVAL_SECS),
            keepalive_timeout: Duration::from_secs(KEEPALIVE_WRITE_TIMEOUT_SECS),
            close_grace_period: Duration::from_millis(CLOSE_GRACE_PERIOD_MS),
        }
    }
}

impl Config {
    pub fn from_args(args: Args) -> Self {
        Self {
            broker_uri: args.broker,
            consumer_uri: args.consumer,
            consumer_port: args.port.filter(|port| *port > 0),
            debug: args.debug,
            log_dir: args.log_dir,
            http_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            session: SessionConfig::default(),
        }
    }
}
