//! Operator-facing output: the session banner and one line per forwarded request

use fhttp_common::HelloMessage;
use fhttp_common::constants::OUTPUT_BODY_PREVIEW_CHARS;
use url::Url;

use crate::forwarder::ForwardOutcome;

/// Sink for human-readable session events
pub trait OperatorOutput: Send + Sync {
    /// The broker greeted this session
    fn session_started(&self, hello: &HelloMessage, consumer: &Url);

    /// A request was replayed against the consumer
    fn request_forwarded(&self, outcome: &ForwardOutcome);
}

/// Writes to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl OperatorOutput for ConsoleOutput {
    fn session_started(&self, hello: &HelloMessage, consumer: &Url) {
        println!("{}", session_banner(hello, consumer));
    }

    fn request_forwarded(&self, outcome: &ForwardOutcome) {
        println!("{}", request_line(outcome));
    }
}

pub fn session_banner(hello: &HelloMessage, consumer: &Url) -> String {
    format!(
        "
Forward HTTP Session Initialized Successfully
---------------------------------------------
Session Hash: {}
Request URI: {}
Consumer URI: {}

* Execute a Request to generate log below
---------------------------------------------",
        hello.hash, hello.request_uri, consumer
    )
}

pub fn request_line(outcome: &ForwardOutcome) -> String {
    format!(
        "{} {}\t\t{}\t\t{}",
        outcome.method,
        outcome.path,
        outcome.status,
        body_preview(&outcome.body)
    )
}

/// Lossy UTF-8 rendering of `body`, cut at a fixed number of characters
pub fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut chars = text.chars();
    let mut preview: String = chars.by_ref().take(OUTPUT_BODY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        preview.push_str("...");
    }
    preview.replace(['\r', '\n'], " ")
}
