//! smsmock core library
//!
//! Domain models, the request parameter resolver, error types and configuration
//! shared by the renderer, the CDN relay and the HTTP API.

pub mod config;
pub mod error;
pub mod models;
pub mod resolver;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    CdnProvider, ImageFormat, MockupRequest, RenderResult, RendererKind, ResponseMode,
    UploadResult,
};
pub use resolver::{mode_from_query, resolve_mockup_request, ValidationError};
