use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::base64_body;

/// An inbound HTTP request to replay against the consumer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerMessage {
    /// Request-target including path and query string
    /// Example: "/api/v1/users?limit=10"
    pub route: String,

    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    pub method: String,

    /// HTTP headers as a map of header name to list of values
    #[serde(default)]
    pub headers: HashMap<String, Vec<String>>,

    /// Raw request body, Base64 on the wire
    #[serde(default, with = "base64_body")]
    pub body: Vec<u8>,
}

impl ConsumerMessage {
    /// Check if the request has a body
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumer_message_wire_format() {
        let json = r#"{
            "route": "/api/test",
            "method": "POST",
            "headers": {"Content-Type": ["application/json"]},
            "body": "eyJhIjoxfQ=="
        }"#;

        let parsed: ConsumerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.route, "/api/test");
        assert_eq!(parsed.method, "POST");
        assert_eq!(
            parsed.headers.get("Content-Type").unwrap(),
            &vec!["application/json".to_string()]
        );
        assert_eq!(parsed.body, br#"{"a":1}"#);
        assert!(parsed.has_body());
    }

    #[test]
    fn test_consumer_message_defaults() {
        let json = r#"{"route": "/", "method": "GET"}"#;

        let parsed: ConsumerMessage = serde_json::from_str(json).unwrap();
        assert!(parsed.headers.is_empty());
        assert!(!parsed.has_body());
    }

    #[test]
    fn test_consumer_message_null_body() {
        let json = r#"{"route": "/", "method": "GET", "body": null}"#;

        let parsed: ConsumerMessage = serde_json::from_str(json).unwrap();
        assert!(parsed.body.is_empty());
    }

    #[test]
    fn test_consumer_message_invalid_body() {
        let json = r#"{"route": "/", "method": "GET", "body": "not base64!!"}"#;
        assert!(serde_json::from_str::<ConsumerMessage>(json).is_err());
    }

    #[test]
    fn test_consumer_message_multiple_header_values() {
        let mut headers = HashMap::new();
        headers.insert(
            "cookie".to_string(),
            vec!["session=abc".to_string(), "token=xyz".to_string()],
        );

        let request = ConsumerMessage {
            route: "/".to_string(),
            method: "GET".to_string(),
            headers,
            body: Vec::new(),
        };

        let json = serde_json::to_string(&request).unwrap();
        let parsed: ConsumerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.headers.get("cookie").unwrap().len(), 2);
    }
}
