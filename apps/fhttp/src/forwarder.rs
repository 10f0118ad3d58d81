//! Replays broker-supplied requests against the local consumer

use fhttp_common::validation::{request_target, validate_route};
use fhttp_common::{ConsumerMessage, Result, TunnelError, map_to_headers};
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::output::OperatorOutput;
use crate::resolver::ConsumerEndpoint;

/// Result of a completed forward
#[derive(Debug, Clone)]
pub struct ForwardOutcome {
    pub method: String,
    /// Effective request-target sent to the consumer
    pub path: String,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

pub struct Forwarder {
    client: Client,
    consumer: ConsumerEndpoint,
    output: Arc<dyn OperatorOutput>,
}

impl Forwarder {
    pub fn new(
        consumer: ConsumerEndpoint,
        output: Arc<dyn OperatorOutput>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TunnelError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            consumer,
            output,
        })
    }

    pub fn consumer(&self) -> &ConsumerEndpoint {
        &self.consumer
    }

    /// Forward one request and report the outcome; failures are logged and dropped
    pub async fn handle(&self, request: ConsumerMessage) {
        let start_time = Instant::now();

        match self.forward(request).await {
            Ok(outcome) => {
                self.output.request_forwarded(&outcome);
                debug!(
                    route = %outcome.path,
                    status = outcome.status.as_u16(),
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "forwarded request to consumer"
                );
            }
            Err(e) => error!(error = %e, "failed to forward request to consumer"),
        }
    }

    /// Replay `request` against the consumer without retrying
    pub async fn forward(&self, request: ConsumerMessage) -> Result<ForwardOutcome> {
        let target = validate_route(&request.route)?;
        let url = self.consumer.scoped(&target);
        let path = request_target(&url).to_string();

        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TunnelError::UnsupportedMethod(request.method.clone()))?;

        let converted = map_to_headers(&request.headers);
        if !converted.rejected.is_empty() {
            warn!(headers = ?converted.rejected, "skipping invalid request headers");
        }

        debug!("Forwarding: {} {}", method, url);

        let mut builder = self
            .client
            .request(method, url)
            .headers(converted.headers);
        if request.has_body() {
            builder = builder.body(request.body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TunnelError::ForwardFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TunnelError::ResponseReadFailed(e.to_string()))?;

        Ok(ForwardOutcome {
            method: request.method,
            path,
            status,
            body: body.to_vec(),
        })
    }
}
