//! Source location tracking for the TJP scanner
//!
//! Every token and every diagnostic carries the position where its construct
//! started. Multi-line strings, comments and macro calls therefore report the
//! line and column of their opening delimiter, not the place where the
//! scanner noticed the end (or the absence of an end).
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position inside one input segment with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of the segment (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, counted in characters)
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position by a string
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// File identity plus line and column, as reported to the outside world
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Name of the file (or pseudo file) the text came from
    pub file: String,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl SourcePosition {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Snapshot a segment position under the given file name
    pub fn at(file: &str, pos: Position) -> Self {
        Self::new(file, pos.line, pos.column)
    }

    /// Segment position that continues counting from this location
    pub fn to_position(&self) -> Position {
        Position::new(0, self.line, self.column)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_over_line_break() {
        let pos = Position::start().advance_str("ab\ncd");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 5);
    }

    #[test]
    fn test_advance_counts_characters_not_bytes() {
        let pos = Position::start().advance_str("äö");
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 4);
    }

    #[test]
    fn test_source_position_display() {
        let pos = SourcePosition::at("project.tjp", Position::new(10, 3, 7));
        assert_eq!(pos.to_string(), "project.tjp:3:7");
        assert_eq!(pos.to_position().line, 3);
    }
}
