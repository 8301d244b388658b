//! Configuration access for logging
//!
//! Buffer limits come from compile-time constants; levels and output format
//! come from runtime preferences, installed once at startup.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Initialize runtime preferences
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    validate_preferences(&preferences)?;

    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized")?;

    Ok(())
}

/// Get runtime preferences (with fallback to defaults)
fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

fn validate_preferences(preferences: &LoggingPreferences) -> Result<(), String> {
    if (preferences.min_log_level as u8) < SECURITY_MIN_LOG_LEVEL {
        return Err(format!(
            "Minimum log level {} would hide warnings; level {} or more verbose required",
            preferences.min_log_level.as_str(),
            SECURITY_MIN_LOG_LEVEL
        ));
    }

    Ok(())
}

/// Get minimum log level
pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

/// Check if structured logging is enabled (user preference)
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Check if console logging is enabled (user preference)
pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

/// Get error buffer size (compile-time constant)
pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

/// Get maximum log message length (compile-time constant)
pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Clip a message to the configured maximum length on a char boundary
pub fn truncate_message(message: &str) -> &str {
    let max = get_max_log_message_length();
    if message.len() <= max {
        return message;
    }
    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

/// Validate current configuration settings
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE == 0 {
        return Err("Log buffer size must be positive".to_string());
    }

    if let Some(preferences) = RUNTIME_PREFERENCES.get() {
        validate_preferences(preferences)?;
    }

    Ok(())
}

/// Get configuration summary for diagnostics
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         - Log buffer size: {}\n\
         - Max message length: {}\n\
         - Min log level: {}\n\
         - Structured logging: {}\n\
         - Console logging: {}",
        LOG_BUFFER_SIZE,
        MAX_LOG_MESSAGE_LENGTH,
        preferences.min_log_level.as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LogLevel;

    #[test]
    fn test_error_level_only_is_rejected() {
        let preferences = LoggingPreferences {
            min_log_level: LogLevel::Error,
            ..Default::default()
        };
        assert!(validate_preferences(&preferences).is_err());

        let preferences = LoggingPreferences {
            min_log_level: LogLevel::Debug,
            ..Default::default()
        };
        assert!(validate_preferences(&preferences).is_ok());
    }

    #[test]
    fn test_truncate_message_respects_char_boundaries() {
        let long = "ä".repeat(get_max_log_message_length());
        let clipped = truncate_message(&long);
        assert!(clipped.len() <= get_max_log_message_length());
        assert!(clipped.chars().all(|c| c == 'ä'));
        assert_eq!(truncate_message("short"), "short");
    }

    #[test]
    fn test_config_summary_mentions_limits() {
        let summary = get_config_summary();
        assert!(summary.contains("Log buffer size"));
        assert!(validate_config().is_ok());
    }
}
