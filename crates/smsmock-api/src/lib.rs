//! smsmock API library
//!
//! HTTP handlers, the mockup pipeline service and application setup.

mod api_doc;
mod handlers;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::mockup::MockupService;
pub use state::AppState;
