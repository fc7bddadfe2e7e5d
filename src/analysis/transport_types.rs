//! Transport types
//!
//! Error and trait shared by the real and fake transports.

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx status; `body` holds the response text when it could be read
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Failed reading the response body
    #[error("IO error: {0}")]
    Io(String),
}

impl TransportError {
    /// Response body attached to the error, if any
    pub fn response_body(&self) -> Option<&str> {
        match self {
            TransportError::Http { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => TransportError::Http {
                status: code,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(err) => TransportError::Network(err.to_string()),
        }
    }
}

/// Synchronous HTTP transport
///
/// Abstraction over the HTTP client so the analysis client can be driven
/// by [`FakeTransport`](super::transport_fake::FakeTransport) in tests.
pub trait SyncTransport: Send + Sync {
    /// POST a JSON body and return the response body on 2xx
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, TransportError>;
}
