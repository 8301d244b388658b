//! Diagnostic codes and their classification
//!
//! Single source of truth for every code the scanner reports, together with
//! the metadata (category, severity, recoverability) that the message
//! handler uses to decide what happens next.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a diagnostic code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INVALID_CONFIGURATION: Code = Code::new("ERR003");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const MALFORMED_INPUT: Code = Code::new("E020");
    pub const UNTERMINATED_CONSTRUCT: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const INVALID_DATE: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const TOO_MANY_TOKENS: Code = Code::new("E025");

    pub const MALFORMED_CUT_MARK: Code = Code::new("W020");
}

/// Macro preprocessing error codes
pub mod macros {
    use super::Code;

    pub const UNDEFINED_MACRO: Code = Code::new("E030");
    pub const MALFORMED_MACRO_ARGUMENTS: Code = Code::new("E031");
    pub const MACRO_EXPANSION_TOO_DEEP: Code = Code::new("E032");
    pub const TOO_MANY_MACRO_ARGUMENTS: Code = Code::new("E033");
}

/// Parser-originated codes reported through the scanner's handler
pub mod parser {
    use super::Code;

    pub const PARSER_ERROR: Code = Code::new("E040");
    pub const PARSER_WARNING: Code = Code::new("W040");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System errors
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                "Critical internal system error",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "ERR003",
                "System",
                Severity::High,
                false,
                "Runtime configuration is invalid",
                "Fix the configuration file or TJP_* environment variables",
            ),
            // File processing errors
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::High,
                false,
                "Source file not found",
                "Verify the file path exists and is accessible",
            ),
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::High,
                false,
                "Source file exceeds the maximum allowed size",
                "Split the project into smaller include files",
            ),
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::High,
                false,
                "Source file is not valid UTF-8",
                "Convert the file to UTF-8",
            ),
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::High,
                false,
                "I/O error while reading source",
                "Check file permissions and disk health",
            ),
            // Lexical errors
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::High,
                false,
                "No token rule matches the input at this position",
                "Remove or quote the offending character",
            ),
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::High,
                false,
                "String, comment, macro body or macro call is never closed",
                "Add the missing closing delimiter",
            ),
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::High,
                false,
                "Numeric literal cannot be represented",
                "Use a smaller number",
            ),
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::High,
                false,
                "Date literal does not name a valid point in time",
                "Use the YYYY-MM-DD[-hh:mm[:ss]][-+zzzz] format with valid values",
            ),
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::High,
                false,
                "String literal exceeds the maximum allowed size",
                "Split the string or move the text into a separate file",
            ),
            ErrorMetadata::new(
                "E025",
                "Lexical",
                Severity::High,
                false,
                "Token count exceeds the maximum allowed",
                "Split the project into smaller files",
            ),
            ErrorMetadata::new(
                "W020",
                "Lexical",
                Severity::Low,
                true,
                "Cut mark -8<- is not immediately followed by a line break",
                "Move the text after -8<- to the next line",
            ),
            // Macro errors
            ErrorMetadata::new(
                "E030",
                "Macro",
                Severity::High,
                false,
                "Macro is called but has not been defined",
                "Define the macro before its first use",
            ),
            ErrorMetadata::new(
                "E031",
                "Macro",
                Severity::High,
                false,
                "Macro arguments must be double quoted strings",
                "Quote every argument and remove trailing text",
            ),
            ErrorMetadata::new(
                "E032",
                "Macro",
                Severity::High,
                false,
                "Too many nested macro calls",
                "Check for a macro that calls itself",
            ),
            ErrorMetadata::new(
                "E033",
                "Macro",
                Severity::Medium,
                false,
                "Too many arguments in one macro call",
                "Reduce the number of arguments",
            ),
            // Parser codes
            ErrorMetadata::new(
                "E040",
                "Parser",
                Severity::High,
                false,
                "Error reported by the project parser",
                "See the message for details",
            ),
            ErrorMetadata::new(
                "W040",
                "Parser",
                Severity::Low,
                true,
                "Warning reported by the project parser",
                "See the message for details",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scanner_code_has_metadata() {
        let codes = [
            lexical::MALFORMED_INPUT,
            lexical::UNTERMINATED_CONSTRUCT,
            lexical::INVALID_NUMBER,
            lexical::INVALID_DATE,
            lexical::STRING_TOO_LARGE,
            lexical::TOO_MANY_TOKENS,
            lexical::MALFORMED_CUT_MARK,
            macros::UNDEFINED_MACRO,
            macros::MALFORMED_MACRO_ARGUMENTS,
            macros::MACRO_EXPANSION_TOO_DEEP,
            macros::TOO_MANY_MACRO_ARGUMENTS,
            file_processing::FILE_NOT_FOUND,
            file_processing::IO_ERROR,
            system::INVALID_CONFIGURATION,
        ];

        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_cut_mark_is_the_only_recoverable_lexical_code() {
        assert!(is_recoverable(lexical::MALFORMED_CUT_MARK.as_str()));
        assert!(!is_recoverable(lexical::UNTERMINATED_CONSTRUCT.as_str()));
        assert!(!is_recoverable(macros::MACRO_EXPANSION_TOO_DEEP.as_str()));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_category("X999"), "Unknown");
        assert_eq!(get_severity("X999"), Severity::Medium);
    }
}
