//! Observability integration.
//!
//! # Data Flow
//! ```text
//! libraries using `tracing`
//!     → bridge.rs (LoggerLayer, a tracing-subscriber Layer)
//!     → Logger::handle
//!     → configured destinations (console / file / syslog)
//! ```
//!
//! # Design Decisions
//! - The bridge is opt-in; the crate's own diagnostics stay on `tracing`
//! - Events whose target belongs to this crate are never forwarded, so a
//!   destination cannot feed its own diagnostics back into itself

pub mod bridge;

pub use bridge::{init_tracing_bridge, LoggerLayer};
