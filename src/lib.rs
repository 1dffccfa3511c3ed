//! Configurable structured logging.
//!
//! Settings are loaded from `LOG_*` environment variables, an env-file or
//! a TOML file. A `LoggerRegistry` hands out named loggers that render
//! records as text, JSON or CSV to the console, a rotating file or syslog.
//!
//! ```no_run
//! use applog::LoggerRegistry;
//!
//! let registry = LoggerRegistry::from_env()?;
//! let logger = registry.get_logger("api")?;
//! applog::warning!(logger, "disk low: {}% used", 93);
//! # Ok::<(), applog::Error>(())
//! ```

pub mod config;
pub mod destination;
pub mod error;
pub mod format;
pub mod logger;
pub mod observability;
pub mod policy;
pub mod record;

pub use config::{DestinationKind, LogFormat, LogLevel, LogSettings, SettingsLoader};
pub use error::{DestinationError, Error, Result, SettingsError};
pub use format::get_formatter;
pub use logger::{Logger, LoggerRegistry};
pub use observability::LoggerLayer;
pub use policy::{parse_retention, parse_rotation};
pub use record::LogRecord;
