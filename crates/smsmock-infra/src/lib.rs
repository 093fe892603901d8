//! smsmock infrastructure library
//!
//! Shared plumbing for the HTTP service and the CLI:
//! - Telemetry initialization
//! - Request ID middleware
//! - CDN upload clients (Uguu, Catbox) and guarded remote image download
//! - Bounded retry of fallible pipelines

pub mod cdn;
pub mod middleware;
pub mod retry;
pub mod telemetry;

// Re-export commonly used types
pub use cdn::{CdnClient, CdnUploaders, RemoteFetcher, UploadError, Uploader};
pub use middleware::{get_request_id, request_id_middleware, RequestId};
pub use retry::{retry, RetryPolicy};
pub use telemetry::init_telemetry;
