//! Core utilities, configuration, and common functionality

pub mod config;
pub mod error;
pub mod platform;

// Re-exports for convenience
pub use config::{OutputPathMarker, Settings};
pub use error::{YtdlError, YtdlResult};
pub use platform::Platform;
