//! Fake transport for testing
//!
//! Uses fixture strings instead of real HTTP calls and remembers every
//! request it was handed.

use crate::analysis::transport_types::{SyncTransport, TransportError};
use parking_lot::Mutex;

/// Request captured by [`FakeTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Canned failure for [`FakeTransport`]
#[derive(Debug, Clone)]
enum FakeFailure {
    Network(String),
    Status(u16, String),
}

/// Fake transport for testing (uses fixture strings)
#[derive(Debug)]
pub struct FakeTransport {
    /// Response body to return
    pub response_body: String,
    failure: Option<FakeFailure>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    /// Create fake transport with given response
    pub fn new(response: &str) -> Self {
        Self {
            response_body: response.to_string(),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create fake transport that returns a network error
    pub fn with_error(msg: &str) -> Self {
        Self {
            failure: Some(FakeFailure::Network(msg.to_string())),
            ..Self::new("")
        }
    }

    /// Create fake transport that answers with a non-2xx status
    pub fn with_status(status: u16, body: &str) -> Self {
        Self {
            failure: Some(FakeFailure::Status(status, body.to_string())),
            ..Self::new("")
        }
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl SyncTransport for FakeTransport {
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, TransportError> {
        self.requests.lock().push(RecordedRequest {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        });

        match &self.failure {
            Some(FakeFailure::Network(msg)) => Err(TransportError::Network(msg.clone())),
            Some(FakeFailure::Status(status, body)) => Err(TransportError::Http {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(self.response_body.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_transport_basic() {
        let transport = FakeTransport::new("test response");
        let result = transport.post_json("http://test", &[], "{}");
        assert_eq!(result.unwrap(), "test response");
    }

    #[test]
    fn test_fake_transport_with_error() {
        let transport = FakeTransport::with_error("test error");
        let result = transport.post_json("http://test", &[], "{}");
        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[test]
    fn test_fake_transport_with_status() {
        let transport = FakeTransport::with_status(503, "busy");
        let err = transport.post_json("http://test", &[], "{}").unwrap_err();
        assert_eq!(err.response_body(), Some("busy"));
        assert_eq!(format!("{}", err), "HTTP error 503: busy");
    }

    #[test]
    fn test_fake_transport_records_requests() {
        let transport = FakeTransport::new("{}");
        transport
            .post_json("http://test/x", &[("Content-Type", "application/json")], "{\"a\":1}")
            .unwrap();
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://test/x");
        assert_eq!(requests[0].body, "{\"a\":1}");
        assert_eq!(
            requests[0].headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Network("test".to_string());
        assert_eq!(format!("{}", err), "Network error: test");
        assert_eq!(err.response_body(), None);
    }
}
