//! Token types produced by the scanner
//!
//! A token pairs a coarse type (what the parser matches on) with a typed
//! value and the position where the construct started.
use crate::timestamp::TjTime;
use crate::utils::SourcePosition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token categories handed to the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// Time of day, `H:MM[:SS]`
    Time,
    /// Calendar date with optional time and zone
    Date,
    Float,
    Integer,
    /// Quoted or scissor string
    String,
    /// Identifier directly followed by a colon, colon removed
    IdWithColon,
    /// Dotted identifier path such as `prj.task.sub`
    AbsoluteId,
    Id,
    /// Macro body in square brackets
    Macro,
    /// Any other single character, or `<=`, `>=`, `!=`
    Literal,
    Eof,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "TIME",
            Self::Date => "DATE",
            Self::Float => "FLOAT",
            Self::Integer => "INTEGER",
            Self::String => "STRING",
            Self::IdWithColon => "ID_WITH_COLON",
            Self::AbsoluteId => "ABSOLUTE_ID",
            Self::Id => "ID",
            Self::Macro => "MACRO",
            Self::Literal => "LITERAL",
            Self::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converted value of a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Integer(i64),
    Float(f64),
    /// Seconds since midnight
    Time(i64),
    Date(TjTime),
    Str(String),
    Empty,
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) | Self::Time(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Date(d) => write!(f, "{}", d),
            Self::Str(s) => f.write_str(s),
            Self::Empty => Ok(()),
        }
    }
}

/// A typed token with its source position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenType,
    pub value: TokenValue,
    pub position: SourcePosition,
}

impl Token {
    pub fn new(kind: TokenType, value: TokenValue, position: SourcePosition) -> Self {
        Self {
            kind,
            value,
            position,
        }
    }

    /// End of input marker
    pub fn eof(position: SourcePosition) -> Self {
        Self::new(TokenType::Eof, TokenValue::Empty, position)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenType::Eof
    }

    /// Textual value of STRING, ID, MACRO and LITERAL tokens
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            TokenValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.value {
            TokenValue::Float(x) => Some(x),
            _ => None,
        }
    }

    /// Seconds since midnight of a TIME token
    pub fn as_time(&self) -> Option<i64> {
        match self.value {
            TokenValue::Time(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&TjTime> {
        match &self.value {
            TokenValue::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Check if this is a LITERAL token with the given text
    pub fn is_literal(&self, text: &str) -> bool {
        self.kind == TokenType::Literal && self.as_str() == Some(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenType::Eof => write!(f, "{}\t{}", self.position, self.kind),
            _ => write!(f, "{}\t{}\t{:?}", self.position, self.kind, self.value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let pos = SourcePosition::new("t.tjp", 1, 1);
        let id = Token::new(TokenType::Id, TokenValue::Str("task".into()), pos.clone());
        assert_eq!(id.as_str(), Some("task"));
        assert_eq!(id.as_integer(), None);

        let lit = Token::new(TokenType::Literal, TokenValue::Str("<=".into()), pos.clone());
        assert!(lit.is_literal("<="));
        assert!(!id.is_literal("task"));

        assert!(Token::eof(pos).is_eof());
    }

    #[test]
    fn test_display_lists_position_type_and_value() {
        let tok = Token::new(
            TokenType::Integer,
            TokenValue::Integer(42),
            SourcePosition::new("t.tjp", 3, 5),
        );
        assert_eq!(tok.to_string(), "t.tjp:3:5\tINTEGER\t\"42\"");
    }

    #[test]
    fn test_json_shape() {
        let tok = Token::new(
            TokenType::IdWithColon,
            TokenValue::Str("start".into()),
            SourcePosition::new("t.tjp", 1, 1),
        );
        let json = serde_json::to_value(&tok).unwrap();
        assert_eq!(json["kind"], "ID_WITH_COLON");
        assert_eq!(json["value"], "start");
        assert_eq!(json["position"]["column"], 1);
    }
}
