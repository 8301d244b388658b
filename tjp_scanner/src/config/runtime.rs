// RUNTIME PREFERENCES (User Experience)

use crate::config::compile_time::lexical::MAX_MACRO_DEPTH;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Errors raised while loading runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid reference UTC offset '{offset}'")]
    InvalidUtcOffset { offset: String },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ConfigError::Io { .. } => crate::logging::codes::file_processing::IO_ERROR,
            ConfigError::Toml(_) | ConfigError::InvalidUtcOffset { .. } => {
                crate::logging::codes::system::INVALID_CONFIGURATION
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerPreferences {
    /// UTC offset applied to DATE literals that carry no zone, e.g. `+0100`
    pub reference_utc_offset: String,

    /// Maximum macro nesting; clamped to the compile-time MAX_MACRO_DEPTH
    pub max_macro_depth: usize,

    /// Whether to trace every mode switch at debug level
    pub trace_mode_switches: bool,

    /// Whether to trace macro expansions at debug level
    pub trace_macro_expansions: bool,
}

impl Default for ScannerPreferences {
    fn default() -> Self {
        Self {
            reference_utc_offset: env::var(env_vars::SCANNER_UTC_OFFSET)
                .unwrap_or_else(|_| "+0000".to_string()),
            max_macro_depth: env::var(env_vars::SCANNER_MAX_MACRO_DEPTH)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_MACRO_DEPTH),
            trace_mode_switches: env::var(env_vars::SCANNER_TRACE_MODES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            trace_macro_expansions: env::var(env_vars::SCANNER_TRACE_MACROS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl ScannerPreferences {
    /// Macro depth actually enforced by the scanner
    pub fn effective_max_macro_depth(&self) -> usize {
        self.max_macro_depth.min(MAX_MACRO_DEPTH)
    }

    /// Parse the configured reference zone
    pub fn reference_offset(&self) -> Result<chrono::FixedOffset, ConfigError> {
        crate::timestamp::parse_utc_offset(&self.reference_utc_offset).ok_or_else(|| {
            ConfigError::InvalidUtcOffset {
                offset: self.reference_utc_offset.clone(),
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Whether to log to the console
    pub enable_console_logging: bool,

    /// Minimum level that reaches the global logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub scanner: ScannerPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a runtime configuration; missing keys fall back to environment defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.scanner.reference_offset()?;
        Ok(config)
    }

    /// Load a runtime configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Scanner
    pub const SCANNER_UTC_OFFSET: &str = "TJP_SCANNER_UTC_OFFSET";
    pub const SCANNER_MAX_MACRO_DEPTH: &str = "TJP_SCANNER_MAX_MACRO_DEPTH";
    pub const SCANNER_TRACE_MODES: &str = "TJP_SCANNER_TRACE_MODES";
    pub const SCANNER_TRACE_MACROS: &str = "TJP_SCANNER_TRACE_MACROS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "TJP_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "TJP_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "TJP_LOGGING_MIN_LEVEL";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_runtime_config_from_toml() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [scanner]
            reference_utc_offset = "+0130"
            max_macro_depth = 5

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.scanner.reference_utc_offset, "+0130");
        assert_eq!(config.scanner.effective_max_macro_depth(), 5.min(MAX_MACRO_DEPTH));
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
        assert_eq!(
            config.scanner.reference_offset().unwrap().local_minus_utc(),
            90 * 60
        );
    }

    #[test]
    fn test_macro_depth_is_clamped() {
        let prefs = ScannerPreferences {
            max_macro_depth: MAX_MACRO_DEPTH + 100,
            ..Default::default()
        };
        assert_eq!(prefs.effective_max_macro_depth(), MAX_MACRO_DEPTH);
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let result = RuntimeConfig::from_toml_str(
            r#"
            [scanner]
            reference_utc_offset = "noon"
            "#,
        );
        assert_matches!(result, Err(ConfigError::InvalidUtcOffset { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RuntimeConfig::load("/definitely/not/here.toml");
        assert_matches!(result, Err(ConfigError::Io { .. }));
    }
}
