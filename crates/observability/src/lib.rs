//! Logging setup shared by every splitledger binary.

/// Tracing subscriber configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{init, LogFormat, UnknownLogFormat};
