//! HTTP transport for the analysis service
//!
//! Uses ureq for blocking I/O.

pub use crate::analysis::transport_fake::{FakeTransport, RecordedRequest};
pub use crate::analysis::transport_types::{SyncTransport, TransportError};
pub use crate::analysis::transport_ureq::UreqTransport;

/// Concrete transport enum
///
/// Wraps all transport types, keeping the client free of trait objects.
#[derive(Debug)]
pub enum Transport {
    Real(UreqTransport),
    Fake(FakeTransport),
}

impl Transport {
    /// Real transport with the given timeout
    pub fn real(timeout_secs: u64) -> Self {
        Transport::Real(UreqTransport::with_timeout(timeout_secs))
    }

    /// Access the fake transport, if that is what this is
    pub fn as_fake(&self) -> Option<&FakeTransport> {
        match self {
            Transport::Fake(t) => Some(t),
            Transport::Real(_) => None,
        }
    }
}

impl SyncTransport for Transport {
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, TransportError> {
        match self {
            Transport::Real(t) => t.post_json(url, headers, body),
            Transport::Fake(t) => t.post_json(url, headers, body),
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Real(UreqTransport::new())
    }
}
