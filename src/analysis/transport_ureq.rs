//! Real HTTP transport using ureq
//!
//! Blocking client; one request per call, no retries.

use crate::analysis::transport_types::{SyncTransport, TransportError};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Real HTTP transport using ureq
#[derive(Debug)]
pub struct UreqTransport {
    /// Timeout in seconds for the whole request
    timeout: u64,
}

impl UreqTransport {
    /// Create new transport with default timeout (600s)
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create transport with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            timeout: timeout_secs,
        }
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncTransport for UreqTransport {
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, TransportError> {
        debug!(url, timeout_secs = self.timeout, body_len = body.len(), "POST");
        let mut request =
            ureq::request("POST", url).timeout(Duration::from_secs(self.timeout));

        for (key, value) in headers {
            request = request.set(key, value);
        }

        // ureq reports 4xx/5xx as Error::Status, converted with the body attached
        let response = request.send_string(body)?;

        let status = response.status();
        if !(200..300).contains(&status) {
            let body = response.into_string().unwrap_or_default();
            return Err(TransportError::Http { status, body });
        }

        let mut reader = response.into_reader();
        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        Ok(body)
    }
}
