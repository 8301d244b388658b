//! Scanner errors
//!
//! Every error records where the offending construct started. Errors raised
//! while reading macro-expanded text also name the macro being expanded.

use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::config::compile_time::lexical::{MAX_STRING_SIZE, MAX_TOKEN_COUNT};
use crate::logging::{codes, Code};
use crate::utils::SourcePosition;
use std::fmt;

/// Construct-start position plus the macro whose expansion was being read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSite {
    pub position: SourcePosition,
    pub macro_name: Option<String>,
}

impl ErrorSite {
    pub fn new(position: SourcePosition, macro_name: Option<String>) -> Self {
        Self {
            position,
            macro_name,
        }
    }
}

impl fmt::Display for ErrorSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.macro_name {
            Some(name) => write!(f, " (in expansion of macro '{}')", name),
            None => Ok(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Unexpected character '{character}'{site}")]
    MalformedInput { character: char, site: ErrorSite },

    #[error("Unterminated {construct}{site}")]
    UnterminatedConstruct {
        construct: &'static str,
        site: ErrorSite,
    },

    #[error("Invalid number '{text}'{site}")]
    InvalidNumber { text: String, site: ErrorSite },

    #[error("Invalid date: {reason}{site}")]
    InvalidDate { reason: String, site: ErrorSite },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE}){site}")]
    StringTooLarge { size: usize, site: ErrorSite },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT}){site}")]
    TooManyTokens { count: usize, site: ErrorSite },

    #[error("Undefined macro '{name}'{site}")]
    UndefinedMacro { name: String, site: ErrorSite },

    #[error("Junk found at end of call of macro '{name}': {remainder}{site}")]
    MalformedMacroArguments {
        name: String,
        remainder: String,
        site: ErrorSite,
    },

    #[error("Too many nested macro calls ({depth}) while expanding '{name}'{site}")]
    MacroExpansionTooDeep {
        name: String,
        depth: usize,
        site: ErrorSite,
    },

    #[error("Macro '{name}' called with {count} arguments (max {max}){site}")]
    TooManyMacroArguments {
        name: String,
        count: usize,
        max: usize,
        site: ErrorSite,
    },

    #[error("{message}{site}")]
    Parser {
        code: Code,
        message: String,
        site: ErrorSite,
    },

    #[error("Cannot open file '{path}'")]
    FileNotFound { path: String },

    #[error("File '{path}' is {size} bytes (max {MAX_FILE_SIZE})")]
    FileTooLarge { path: String, size: u64 },

    #[error("File '{path}' is not valid UTF-8")]
    InvalidEncoding { path: String },

    #[error("Error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub fn error_code(&self) -> Code {
        match self {
            ScanError::MalformedInput { .. } => codes::lexical::MALFORMED_INPUT,
            ScanError::UnterminatedConstruct { .. } => codes::lexical::UNTERMINATED_CONSTRUCT,
            ScanError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            ScanError::InvalidDate { .. } => codes::lexical::INVALID_DATE,
            ScanError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            ScanError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            ScanError::UndefinedMacro { .. } => codes::macros::UNDEFINED_MACRO,
            ScanError::MalformedMacroArguments { .. } => codes::macros::MALFORMED_MACRO_ARGUMENTS,
            ScanError::MacroExpansionTooDeep { .. } => codes::macros::MACRO_EXPANSION_TOO_DEEP,
            ScanError::TooManyMacroArguments { .. } => codes::macros::TOO_MANY_MACRO_ARGUMENTS,
            ScanError::Parser { code, .. } => *code,
            ScanError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            ScanError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            ScanError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            ScanError::Io { .. } => codes::file_processing::IO_ERROR,
        }
    }

    /// Where the failing construct started; file errors have no position
    pub fn site(&self) -> Option<&ErrorSite> {
        match self {
            ScanError::MalformedInput { site, .. }
            | ScanError::UnterminatedConstruct { site, .. }
            | ScanError::InvalidNumber { site, .. }
            | ScanError::InvalidDate { site, .. }
            | ScanError::StringTooLarge { site, .. }
            | ScanError::TooManyTokens { site, .. }
            | ScanError::UndefinedMacro { site, .. }
            | ScanError::MalformedMacroArguments { site, .. }
            | ScanError::MacroExpansionTooDeep { site, .. }
            | ScanError::TooManyMacroArguments { site, .. }
            | ScanError::Parser { site, .. } => Some(site),
            ScanError::FileNotFound { .. }
            | ScanError::FileTooLarge { .. }
            | ScanError::InvalidEncoding { .. }
            | ScanError::Io { .. } => None,
        }
    }

    pub fn position(&self) -> Option<&SourcePosition> {
        self.site().map(|site| &site.position)
    }

    /// Map a read failure to the matching file error
    pub fn from_io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => ScanError::FileNotFound {
                path: path.to_string(),
            },
            _ => ScanError::Io {
                path: path.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_message_names_enclosing_macro() {
        let err = ScanError::UndefinedMacro {
            name: "inner".into(),
            site: ErrorSite::new(SourcePosition::new("p.tjp", 3, 1), Some("outer".into())),
        };
        assert_eq!(
            err.to_string(),
            "Undefined macro 'inner' (in expansion of macro 'outer')"
        );
        assert_eq!(err.error_code(), codes::macros::UNDEFINED_MACRO);
        assert_eq!(err.position().map(|p| p.line), Some(3));
    }

    #[test]
    fn test_io_mapping() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_matches!(
            ScanError::from_io("x.tjp", missing),
            ScanError::FileNotFound { .. }
        );

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        let err = ScanError::from_io("x.tjp", denied);
        assert_eq!(err.error_code(), codes::file_processing::IO_ERROR);
        assert!(err.position().is_none());
    }
}
