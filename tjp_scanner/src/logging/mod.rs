//! Global logging module for the TJP scanner
//!
//! Two channels share the same event types. The per-scanner message handler
//! (any `Logger`) receives user-facing diagnostics. The global service,
//! driven by the `log_*!` macros, receives traces and tool-level messages.

#[macro_use]
pub mod macros;
pub mod codes;
pub mod config;
pub mod events;
pub mod service;

use crate::utils::SourcePosition;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
#[cfg(feature = "logging")]
pub use service::LogCrateLogger;
pub use service::{
    ConsoleLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger,
};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Initialize global logging system
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    for code in [
        codes::lexical::MALFORMED_INPUT,
        codes::macros::UNDEFINED_MACRO,
        codes::file_processing::FILE_NOT_FOUND,
    ] {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (primarily for tools and tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether a debug event would reach the global logger
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

/// Send an event to the global logger if one is installed (used by macros)
pub fn log_event_if_enabled(event: LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(
    code: Code,
    message: &str,
    position: Option<SourcePosition>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, config::truncate_message(message));

    if let Some(p) = position {
        event = event.with_position(p);
    }

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    log_event_if_enabled(event);
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, config::truncate_message(message));

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    log_event_if_enabled(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_global_is_silent() {
        // Other tests may install a logger; both states must be safe
        log_event_if_enabled(LogEvent::info("nothing listens"));
        if !is_initialized() {
            assert!(!debug_enabled());
            assert!(try_get_global_logger().is_none());
        }
    }
}
