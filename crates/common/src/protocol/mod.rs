mod consumer;
mod hello;
mod message;

pub use consumer::ConsumerMessage;
pub use hello::HelloMessage;
pub use message::{Envelope, MessageKind};
