//! Wire protocol and shared utilities for the fhttp client
//!
//! This crate fixes the broker's message contract (envelope, hello and consumer
//! payloads) and provides the validation and encoding helpers the client engine uses.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod utils;
pub mod validation;

// Re-export commonly used types for convenience
pub use error::{Result, TunnelError};
pub use protocol::{ConsumerMessage, Envelope, HelloMessage, MessageKind};
pub use utils::{ConvertedHeaders, decode_body, encode_body, map_to_headers};
pub use validation::{RequestTarget, ValidationError};
