//! Remote failure analysis
//!
//! Wire types, the analysis index, the client, and its synchronous HTTP
//! transport (real via ureq, fake for tests).

pub mod client;
pub mod index;
pub mod payload;
pub mod transport;
pub mod transport_fake;
pub mod transport_types;
pub mod transport_ureq;

pub use client::{parse_response, AnalysisClient, ANALYZE_PATH};
pub use index::AnalysisIndex;
pub use payload::{AnalysisPayload, CodeFix, ProductBugReport};
pub use transport::{FakeTransport, RecordedRequest, SyncTransport, Transport, TransportError, UreqTransport};
