//! Rule table driving the scanner
//!
//! Each mode owns an ordered list of rules. The first rule whose pattern
//! matches at the cursor wins, even if a later rule would match more text.
//! Patterns only ever see the rest of the current line, line break included.

use super::error::ScanError;
use super::scanner::Scanner;
use crate::tokens::{TokenType, TokenValue};
use crate::utils::SourcePosition;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Lexical sub-state selecting the active rule list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Main,
    CStyleComment,
    DoubleQuotedString,
    SingleQuotedString,
    ScissorFirstLine,
    ScissorBody,
    MacroDefCapture,
    MacroCallCapture,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Main => "main",
            Mode::CStyleComment => "c-comment",
            Mode::DoubleQuotedString => "dq-string",
            Mode::SingleQuotedString => "sq-string",
            Mode::ScissorFirstLine => "scissor-first-line",
            Mode::ScissorBody => "scissor-body",
            Mode::MacroDefCapture => "macro-definition",
            Mode::MacroCallCapture => "macro-call",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rule callback wants done with its match
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Emit a token at the position where the match started
    Emit(TokenValue),
    /// Emit a token at an earlier construct start
    EmitAt(TokenValue, SourcePosition),
    /// Consume silently
    Skip,
}

/// Rule callback: may switch modes, touch the current construct or push
/// input, and decides what the match produces
pub type Converter = fn(&mut Scanner, &str) -> Result<Action, ScanError>;

pub struct Rule {
    /// `None` marks a suppressed rule: whatever it produces is dropped
    pub token_type: Option<TokenType>,
    pub pattern: Regex,
    pub mode: Mode,
    /// `None` emits the matched text verbatim
    pub converter: Option<Converter>,
}

impl Rule {
    /// Length in bytes of the match at the start of `line`; empty matches don't count
    pub fn match_len(&self, line: &str) -> Option<usize> {
        self.pattern
            .find(line)
            .map(|m| m.end())
            .filter(|&len| len > 0)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("token_type", &self.token_type)
            .field("pattern", &self.pattern.as_str())
            .field("mode", &self.mode)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct RuleTable {
    rules: HashMap<Mode, Vec<Rule>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to its mode; `pattern` is anchored at the cursor
    pub fn add_rule(
        &mut self,
        token_type: Option<TokenType>,
        pattern: &str,
        mode: Mode,
        converter: Option<Converter>,
    ) -> Result<&mut Self, regex::Error> {
        let pattern = Regex::new(&format!("^(?:{})", pattern))?;
        self.rules.entry(mode).or_default().push(Rule {
            token_type,
            pattern,
            mode,
            converter,
        });
        Ok(self)
    }

    pub fn rules_for(&self, mode: Mode) -> &[Rule] {
        self.rules.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The TJP rule set
    pub fn tjp() -> Result<Self, regex::Error> {
        use Mode::*;
        use TokenType as T;

        const ID: &str = "[a-zA-Z_][a-zA-Z0-9_]*";
        const DQ_TEXT: &str = r#"(?:\\"|[^"])*"#;
        const SQ_TEXT: &str = r"(?:\\'|[^'])*";

        let mut table = Self::new();
        table
            // Whitespace and comments
            .add_rule(None, r"\s+", Main, None)?
            .add_rule(None, r"#.*\n?", Main, None)?
            .add_rule(None, r"//.*\n?", Main, None)?
            .add_rule(None, r"/\*.*\*/", Main, None)?
            .add_rule(None, r"/\*.*\n", Main, Some(Scanner::start_comment))?
            .add_rule(None, r".*\*/", CStyleComment, Some(Scanner::end_comment))?
            .add_rule(None, r".*\n", CStyleComment, None)?
            // Numbers, times and dates
            .add_rule(Some(T::Time), "[0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?", Main, Some(Scanner::convert_time))?
            .add_rule(
                Some(T::Date),
                "[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}(?:-[0-9]{1,2}:[0-9]{1,2}(?::[0-9]{1,2})?(?:-[-+]?[0-9]{4})?)?",
                Main,
                Some(Scanner::convert_date),
            )?
            .add_rule(Some(T::Float), r"[0-9]*\.[0-9]+", Main, Some(Scanner::convert_float))?
            .add_rule(Some(T::Integer), "[0-9]+", Main, Some(Scanner::convert_integer))?
            // Double quoted strings
            .add_rule(None, &format!("\"{}", DQ_TEXT), Main, Some(Scanner::start_dq_string))?
            .add_rule(None, &format!("{}\n", DQ_TEXT), DoubleQuotedString, Some(Scanner::mid_string))?
            .add_rule(Some(T::String), &format!("{}\"", DQ_TEXT), DoubleQuotedString, Some(Scanner::end_string))?
            // Single quoted strings
            .add_rule(None, &format!("'{}", SQ_TEXT), Main, Some(Scanner::start_sq_string))?
            .add_rule(None, &format!("{}\n", SQ_TEXT), SingleQuotedString, Some(Scanner::mid_string))?
            .add_rule(Some(T::String), &format!("{}'", SQ_TEXT), SingleQuotedString, Some(Scanner::end_string))?
            // Scissor strings
            .add_rule(None, r"-8<-.*\n", Main, Some(Scanner::start_scissor))?
            .add_rule(Some(T::String), r"\s*->8-", ScissorFirstLine, Some(Scanner::end_scissor))?
            .add_rule(Some(T::String), r"\s*->8-", ScissorBody, Some(Scanner::end_scissor))?
            .add_rule(None, r".*\n", ScissorFirstLine, Some(Scanner::first_scissor_line))?
            .add_rule(None, r".*\n", ScissorBody, Some(Scanner::mid_scissor_line))?
            // Identifiers
            .add_rule(Some(T::IdWithColon), &format!("{}:", ID), Main, Some(Scanner::convert_id_with_colon))?
            .add_rule(Some(T::AbsoluteId), &format!(r"{}(?:\.{})+", ID, ID), Main, None)?
            .add_rule(Some(T::Id), ID, Main, None)?
            // Macro definitions
            .add_rule(Some(T::Macro), r"\[.*\]\n", Main, Some(Scanner::convert_macro))?
            .add_rule(None, r"\[.*\n", Main, Some(Scanner::start_macro_def))?
            .add_rule(Some(T::Macro), r".*\]\n", MacroDefCapture, Some(Scanner::end_macro_def))?
            .add_rule(None, r".*\n", MacroDefCapture, Some(Scanner::mid_macro_def))?
            // Macro calls
            .add_rule(
                None,
                &format!(r#"\$\{{\s*{}(?:\s*"{}")*"#, ID, DQ_TEXT),
                Main,
                Some(Scanner::start_macro_call),
            )?
            .add_rule(
                None,
                &format!(r#"(?:\s*"{}")*\s*\}}"#, DQ_TEXT),
                MacroCallCapture,
                Some(Scanner::end_macro_call),
            )?
            // Anything else up to the first `}` closes the call and fails argument parsing
            .add_rule(None, r"[^}\n]*\}", MacroCallCapture, Some(Scanner::end_macro_call))?
            .add_rule(None, r".*\n", MacroCallCapture, Some(Scanner::mid_macro_call))?
            // Literals; the single character catch-all stays last
            .add_rule(Some(T::Literal), "<=?", Main, None)?
            .add_rule(Some(T::Literal), ">=?", Main, None)?
            .add_rule(Some(T::Literal), "!=?", Main, None)?
            .add_rule(Some(T::Literal), ".", Main, None)?;

        Ok(table)
    }
}

/// Shared TJP rule table, compiled once
pub fn default_rules() -> Arc<RuleTable> {
    static RULES: OnceLock<Arc<RuleTable>> = OnceLock::new();
    RULES
        .get_or_init(|| Arc::new(RuleTable::tjp().expect("built-in TJP patterns are valid")))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_compiles_and_covers_every_mode() {
        let table = RuleTable::tjp().unwrap();
        for mode in [
            Mode::Main,
            Mode::CStyleComment,
            Mode::DoubleQuotedString,
            Mode::SingleQuotedString,
            Mode::ScissorFirstLine,
            Mode::ScissorBody,
            Mode::MacroDefCapture,
            Mode::MacroCallCapture,
        ] {
            assert!(!table.rules_for(mode).is_empty(), "no rules for {}", mode);
        }
    }

    #[test]
    fn test_catch_all_literal_is_last_in_main() {
        let table = default_rules();
        let last = table.rules_for(Mode::Main).last().unwrap();
        assert_eq!(last.token_type, Some(TokenType::Literal));
        assert_eq!(last.pattern.as_str(), "^(?:.)");
    }

    #[test]
    fn test_patterns_are_anchored_and_line_bound() {
        let mut table = RuleTable::new();
        table.add_rule(Some(TokenType::Id), "[a-z]+", Mode::Main, None).unwrap();
        let rule = &table.rules_for(Mode::Main)[0];

        assert_eq!(rule.match_len("abc def\n"), Some(3));
        assert_eq!(rule.match_len(" abc\n"), None);
    }

    #[test]
    fn test_empty_matches_are_ignored() {
        let mut table = RuleTable::new();
        table.add_rule(None, "x*", Mode::Main, None).unwrap();
        assert_eq!(table.rules_for(Mode::Main)[0].match_len("y\n"), None);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let mut table = RuleTable::new();
        assert!(table.add_rule(None, "(", Mode::Main, None).is_err());
    }
}
