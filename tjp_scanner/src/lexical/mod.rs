//! Lexical analysis for TaskJuggler project files
//!
//! The [`Scanner`] turns `.tjp`/`.tji` text into typed tokens. It handles
//! comments, quoted and scissor strings, macro definitions and `${...}`
//! macro calls, whose expansions it reads in place of the call.

pub mod constructs;
pub mod converters;
pub mod error;
pub mod macros;
pub mod rules;
pub mod scanner;
pub mod segment;

use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::config::compile_time::lexical::*;
use crate::logging::{codes, Logger};
use crate::tokens::{Token, TokenType};
use std::path::Path;
use std::sync::Arc;

pub use error::{ErrorSite, ScanError};
pub use macros::{MacroCall, MacroDefinition, MacroTable};
pub use rules::{default_rules, Action, Converter, Mode, Rule, RuleTable};
pub use scanner::{ScanMetrics, Scanner};

// ============================================================================
// MODULE API
// ============================================================================

/// Scan in-memory text to the end; the returned tokens exclude EOF
pub fn tokenize_str(
    file: &str,
    text: &str,
    handler: Arc<dyn Logger>,
) -> Result<Vec<Token>, ScanError> {
    collect_tokens(Scanner::new(file, text, handler))
}

/// Scan a file to the end; the returned tokens exclude EOF
pub fn tokenize_file<P: AsRef<Path>>(
    path: P,
    handler: Arc<dyn Logger>,
) -> Result<Vec<Token>, ScanError> {
    collect_tokens(Scanner::from_file_with_handler(path, handler)?)
}

fn collect_tokens(scanner: Scanner) -> Result<Vec<Token>, ScanError> {
    let mut tokens = Vec::new();
    for token in scanner {
        let token = token?;
        if !token.is_eof() {
            tokens.push(token);
        }
    }
    Ok(tokens)
}

// ============================================================================
// MODULE VALIDATION
// ============================================================================

const SCANNER_ERROR_CODES: [crate::logging::Code; 13] = [
    codes::file_processing::FILE_NOT_FOUND,
    codes::file_processing::FILE_TOO_LARGE,
    codes::file_processing::INVALID_ENCODING,
    codes::lexical::MALFORMED_INPUT,
    codes::lexical::UNTERMINATED_CONSTRUCT,
    codes::lexical::INVALID_NUMBER,
    codes::lexical::INVALID_DATE,
    codes::lexical::STRING_TOO_LARGE,
    codes::lexical::TOO_MANY_TOKENS,
    codes::macros::UNDEFINED_MACRO,
    codes::macros::MALFORMED_MACRO_ARGUMENTS,
    codes::macros::MACRO_EXPANSION_TOO_DEEP,
    codes::macros::TOO_MANY_MACRO_ARGUMENTS,
];

/// Check that every scanner error code is registered and the limits are usable
pub fn validate_scanner() -> Result<(), String> {
    for code in &SCANNER_ERROR_CODES {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Scanner error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    if let Err(e) = RuleTable::tjp() {
        return Err(format!("Built-in rule table does not compile: {}", e));
    }

    let limits = get_scan_limits();
    if limits.max_string_size == 0 || limits.max_token_count == 0 {
        return Err("String and token limits cannot be zero".to_string());
    }
    if limits.max_macro_depth == 0 {
        return Err("MAX_MACRO_DEPTH cannot be zero".to_string());
    }

    crate::log_debug!("Scanner limits initialized",
        "max_string_size" => limits.max_string_size,
        "max_token_count" => limits.max_token_count,
        "max_macro_depth" => limits.max_macro_depth,
        "max_macro_arguments" => limits.max_macro_arguments,
        "max_file_size" => limits.max_file_size
    );

    Ok(())
}

/// Compile-time limits the scanner enforces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLimits {
    pub max_file_size: u64,
    pub max_string_size: usize,
    pub max_token_count: usize,
    pub max_macro_depth: usize,
    pub max_macro_arguments: usize,
}

pub fn get_scan_limits() -> ScanLimits {
    ScanLimits {
        max_file_size: MAX_FILE_SIZE,
        max_string_size: MAX_STRING_SIZE,
        max_token_count: MAX_TOKEN_COUNT,
        max_macro_depth: MAX_MACRO_DEPTH,
        max_macro_arguments: MAX_MACRO_ARGUMENTS,
    }
}

// ============================================================================
// TOKEN STATISTICS
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenCounts {
    pub total: usize,
    pub identifiers: usize,
    pub numbers: usize,
    pub strings: usize,
    pub dates_and_times: usize,
    pub macros: usize,
    pub literals: usize,
}

pub fn get_token_counts(tokens: &[Token]) -> TokenCounts {
    let mut counts = TokenCounts::default();

    for token in tokens {
        if token.is_eof() {
            continue;
        }
        counts.total += 1;
        match token.kind {
            TokenType::Id | TokenType::IdWithColon | TokenType::AbsoluteId => {
                counts.identifiers += 1
            }
            TokenType::Integer | TokenType::Float => counts.numbers += 1,
            TokenType::String => counts.strings += 1,
            TokenType::Date | TokenType::Time => counts.dates_and_times += 1,
            TokenType::Macro => counts.macros += 1,
            TokenType::Literal => counts.literals += 1,
            TokenType::Eof => {}
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_validate_scanner() {
        assert!(validate_scanner().is_ok());
    }

    #[test]
    fn test_tokenize_str_counts() {
        let logger = Arc::new(MemoryLogger::new());
        let tokens = tokenize_str(
            "p.tjp",
            "task t \"Task\" {\n  start 2024-03-01\n  effort 5.5d\n}\nmacro m [x]\n",
            logger,
        )
        .unwrap();

        let counts = get_token_counts(&tokens);
        assert_eq!(counts.total, tokens.len());
        assert_eq!(counts.strings, 1);
        assert_eq!(counts.dates_and_times, 1);
        assert_eq!(counts.numbers, 1);
        assert_eq!(counts.macros, 1);
        assert_eq!(counts.literals, 2);
        assert_eq!(counts.identifiers, 7);
    }

    #[test]
    fn test_tokenize_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.tjp");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "resource r1 'Ann'").unwrap();

        let logger = Arc::new(MemoryLogger::new());
        let tokens = tokenize_file(&path, logger.clone()).unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].as_str(), Some("Ann"));
        assert!(logger.get_errors().is_empty());
    }

    #[test]
    fn test_tokenize_file_rejects_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[b'a', 0xff, 0xfe, b'\n']).unwrap();

        let logger = Arc::new(MemoryLogger::new());
        assert_matches!(
            tokenize_file(file.path(), logger.clone()),
            Err(ScanError::InvalidEncoding { .. })
        );
        assert!(logger.has_error_with_code(codes::file_processing::INVALID_ENCODING));
    }

    #[test]
    fn test_scan_limits_match_configuration() {
        let limits = get_scan_limits();
        assert_eq!(limits.max_macro_depth, MAX_MACRO_DEPTH);
        assert!(limits.max_file_size > 0);
    }
}
