/// Interval between keepalive pings on the tunnel connection (5 seconds)
pub const KEEPALIVE_INTERVAL_SECS: u64 = 5;

/// Write deadline for a single keepalive ping (5 seconds)
pub const KEEPALIVE_WRITE_TIMEOUT_SECS: u64 = 5;

/// Timeout for outbound HTTP calls: session bootstrap and consumer forwards (5 seconds)
pub const HTTP_TIMEOUT_SECS: u64 = 5;

/// Delay between sending the close frame and dropping the transport (1 second)
pub const CLOSE_GRACE_PERIOD_MS: u64 = 1000;

/// Length of a broker-assigned session hash
pub const SESSION_HASH_LEN: usize = 10;

/// Path value that asks the broker for a fresh session
pub const NEW_SESSION_SENTINEL: &str = "new";

/// Path prefix of a tunnel open endpoint
pub const OPEN_PATH_PREFIX: &str = "/open/";

/// Schemes accepted for the broker URI
pub const ALLOWED_BROKER_SCHEMES: &[&str] = &["http", "https"];

/// Default broker origin
pub const DEFAULT_BROKER_URI: &str = "https://fhttp.dev";

/// Default consumer origin
pub const DEFAULT_CONSUMER_URI: &str = "http://127.0.0.1";

/// Maximum number of body characters shown per forwarded request line
pub const OUTPUT_BODY_PREVIEW_CHARS: usize = 64;
