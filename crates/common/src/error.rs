use thiserror::Error;

use crate::validation::ValidationError;

/// Error types for the fhttp client
#[derive(Error, Debug)]
pub enum TunnelError {
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Unsupported URI scheme '{scheme}', must be one of {allowed}")]
    UnsupportedScheme { scheme: String, allowed: String },

    #[error("Invalid format of open path, expected /open/{{hash}}, got {0}")]
    MalformedOpenPath(String),

    #[error("Failed to fetch session hash (status {status}): {body}")]
    BootstrapFailed { status: String, body: String },

    #[error("Broker assigned an invalid session hash: {0:?}")]
    InvalidSessionHash(String),

    #[error("Unexpected message type received from broker: {0}")]
    UnexpectedMessageKind(String),

    #[error("Request route is unroutable: {0}")]
    UnroutableRequest(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Failed to execute request to consumer: {0}")]
    ForwardFailed(String),

    #[error("Failed to read response body: {0}")]
    ResponseReadFailed(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    #[error("Timeout waiting for {0}")]
    Timeout(&'static str),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<url::ParseError> for TunnelError {
    fn from(err: url::ParseError) -> Self {
        TunnelError::InvalidUri(err.to_string())
    }
}

impl From<ValidationError> for TunnelError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MalformedOpenPath(path) => TunnelError::MalformedOpenPath(path),
            other => TunnelError::UnroutableRequest(other.to_string()),
        }
    }
}

/// Type alias for Results using TunnelError
pub type Result<T> = std::result::Result<T, TunnelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TunnelError::UnsupportedScheme {
            scheme: "ftp".to_string(),
            allowed: "http,https".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported URI scheme 'ftp', must be one of http,https"
        );

        let err = TunnelError::MalformedOpenPath("/open/a/b".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid format of open path, expected /open/{hash}, got /open/a/b"
        );

        let err = TunnelError::InvalidSessionHash("new".to_string());
        assert_eq!(
            err.to_string(),
            r#"Broker assigned an invalid session hash: "new""#
        );

        let err = TunnelError::Timeout("keepalive write");
        assert_eq!(err.to_string(), "Timeout waiting for keepalive write");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());

        let tunnel_err: TunnelError = json_err.unwrap_err().into();
        assert!(matches!(tunnel_err, TunnelError::SerializationError(_)));

        let url_err = url::Url::parse("not a uri").unwrap_err();
        let tunnel_err: TunnelError = url_err.into();
        assert!(matches!(tunnel_err, TunnelError::InvalidUri(_)));
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: TunnelError = ValidationError::MalformedOpenPath("/open/a/b".into()).into();
        assert!(matches!(err, TunnelError::MalformedOpenPath(_)));

        let err: TunnelError = ValidationError::EmptyRoute.into();
        assert!(matches!(err, TunnelError::UnroutableRequest(_)));
    }
}
