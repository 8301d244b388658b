//! Configuration module for the TJP scanner
//! Compile-time limits are generated from TOML configuration by build.rs

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{ConfigError, LoggingPreferences, RuntimeConfig, ScannerPreferences};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("TJP_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("TJP_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::{file_processing, lexical, logging};
    use super::*;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(lexical::MAX_MACRO_DEPTH > 0);
        assert!(lexical::MAX_MACRO_ARGUMENTS > 0);
        assert!(lexical::MAX_STRING_SIZE > 0);
        assert!(lexical::MAX_TOKEN_COUNT > 0);
        assert!(file_processing::MAX_FILE_SIZE > 0);
        assert!(logging::SECURITY_MIN_LOG_LEVEL <= 2);
    }

    #[test]
    fn test_source_info() {
        assert!(build_info::source_info().ends_with(".toml"));
    }
}
