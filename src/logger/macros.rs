//! Leveled logging macros taking `format!`-style arguments.
//!
//! ```no_run
//! use applog::{LoggerRegistry, LogSettings};
//!
//! let registry = LoggerRegistry::new(LogSettings::default());
//! let logger = registry.get_logger("app")?;
//! applog::info!(logger, "listening on {addr}", addr = "0.0.0.0:8080");
//! applog::warning!(logger, "retry {} of {}", 2, 5);
//! # Ok::<(), applog::Error>(())
//! ```

/// Log at an explicit level.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::LogLevel::Debug, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::LogLevel::Info, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::LogLevel::Warning, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::LogLevel::Error, ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::LogLevel::Critical, ::std::format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::config::{LogLevel, LogSettings};
    use crate::destination::{ConsoleStream, SharedBuffer};
    use crate::logger::Logger;

    #[test]
    fn test_positional_and_named_arguments() {
        let buffer = SharedBuffer::new();
        let settings = LogSettings {
            level: LogLevel::Debug,
            message_template: "{level}:{module}:{message}".to_string(),
            ..LogSettings::default()
        };
        let logger = Logger::from_settings("app", &settings, &ConsoleStream::Buffer(buffer.clone())).unwrap();

        crate::debug!(logger, "user {} logged in", 42);
        crate::warning!(logger, "queue at {pct}%", pct = 93);
        crate::log!(logger, LogLevel::Critical, "plain");

        assert_eq!(
            buffer.lines(),
            vec![
                "DEBUG:macros:user 42 logged in",
                "WARNING:macros:queue at 93%",
                "CRITICAL:macros:plain",
            ]
        );
    }
}
