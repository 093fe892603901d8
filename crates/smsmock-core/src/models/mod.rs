//! Data models for the application
//!
//! Everything here is transient: constructed at request entry, consumed by the
//! rendering pipeline and dropped with the response.

mod cdn;
mod mockup;

pub use cdn::*;
pub use mockup::*;
