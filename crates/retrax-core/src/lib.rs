//! retrax core - shared infrastructure for harvest and analysis
//!
//! Provides the HTTP client/runtime pair, logging setup, and the
//! cooperative shutdown flag shared by the CLI and the harvest loop.

pub mod http;
pub mod logging;
pub mod shutdown;

// Re-exports for convenience
pub use http::{SHARED_RUNTIME, http_client};
pub use logging::init_logging;
pub use shutdown::ShutdownFlag;
