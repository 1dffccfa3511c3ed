//! Logging settings subsystem.
//!
//! # Data Flow
//! ```text
//! defaults < env-file (.env) < process env (LOG_*)     or     TOML [log] table
//!     → loader.rs (collect prefixed keys, case-insensitive)
//!     → validation.rs (normalize + reject bad level/format)
//!     → LogSettings (validated, immutable)
//!     → shared via Arc with the logger registry
//!
//! On env-file change:
//!     watcher.rs detects change
//!     → loader.rs loads new settings
//!     → validation.rs validates
//!     → LoggerRegistry::reload swaps settings and rebuilds loggers
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; changes require a full reload
//! - Every field has a default so an empty environment is valid
//! - Only enumerated literals fail; malformed intervals and handler
//!   lists degrade to defaults

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_settings_file, SettingsLoader, SettingsSource, DEFAULT_ENV_FILE, ENV_PREFIX};
pub use schema::{
    DestinationKind, LogFormat, LogLevel, LogSettings, DEFAULT_DATE_FORMAT, DEFAULT_MESSAGE_TEMPLATE,
};
pub use validation::RawLogSettings;
pub use watcher::SettingsWatcher;
