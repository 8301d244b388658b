//! Input segments: the texts the scanner reads from, innermost on top
//!
//! The bottom of the stack is the master file. Included files and macro
//! expansions are pushed on top and read first. A segment that has been
//! read to the end stays on the stack until the scanner asks for more
//! input, so a call at the very end of a macro body still counts as nested.
//!
//! An expansion's last line has no line break of its own. It continues with
//! the rest of the line the call was read from, as if the expansion had been
//! written there.

use crate::utils::{Position, SourcePosition};
use std::borrow::Cow;

#[derive(Debug)]
pub struct InputSegment {
    /// File the text belongs to; expansions inherit the file of their call
    file: String,
    text: String,
    cursor: usize,
    position: Position,
    /// Name of the macro this segment is an expansion of
    macro_name: Option<String>,
}

impl InputSegment {
    /// A source file or in-memory source; a final line break is added if missing
    pub fn source(file: impl Into<String>, mut text: String) -> Self {
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Self {
            file: file.into(),
            text,
            cursor: 0,
            position: Position::start(),
            macro_name: None,
        }
    }

    /// Expanded macro text, positioned at its call site
    pub fn expansion(macro_name: &str, text: String, call_site: &SourcePosition) -> Self {
        Self {
            file: call_site.file.clone(),
            text,
            cursor: 0,
            position: call_site.to_position(),
            macro_name: Some(macro_name.to_string()),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn macro_name(&self) -> Option<&str> {
        self.macro_name.as_deref()
    }

    pub fn is_expansion(&self) -> bool {
        self.macro_name.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.text.len()
    }

    /// Position of the next unread character
    pub fn source_position(&self) -> SourcePosition {
        SourcePosition::at(&self.file, self.position)
    }

    /// Unread part of the current line, including its line break
    pub fn current_line(&self) -> &str {
        let rest = &self.text[self.cursor..];
        match rest.find('\n') {
            Some(i) => &rest[..=i],
            None => rest,
        }
    }

    /// Consume `len` bytes of the current line
    pub fn advance(&mut self, len: usize) {
        let end = (self.cursor + len).min(self.text.len());
        self.position = self.position.advance_str(&self.text[self.cursor..end]);
        self.cursor = end;
    }
}

#[derive(Debug, Default)]
pub struct SegmentStack {
    segments: Vec<InputSegment>,
}

impl SegmentStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: InputSegment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<InputSegment> {
        self.segments.pop()
    }

    pub fn top(&self) -> Option<&InputSegment> {
        self.segments.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut InputSegment> {
        self.segments.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Number of macro expansions currently on the stack
    pub fn expansion_depth(&self) -> usize {
        self.segments.iter().filter(|s| s.is_expansion()).count()
    }

    /// Innermost macro being expanded, if any
    pub fn current_macro(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|s| s.macro_name())
    }

    /// Unread line of the top segment, joined with the enclosing segments'
    /// lines until a line break is reached
    pub fn current_line(&self) -> Cow<'_, str> {
        let mut segments = self.segments.iter().rev();
        let Some(top) = segments.next() else {
            return Cow::Borrowed("");
        };

        let first = top.current_line();
        if first.ends_with('\n') {
            return Cow::Borrowed(first);
        }

        let mut line = first.to_string();
        for segment in segments {
            line.push_str(segment.current_line());
            if line.ends_with('\n') {
                break;
            }
        }
        Cow::Owned(line)
    }

    /// Consume `len` bytes of [`current_line`](Self::current_line), top segment first
    pub fn advance(&mut self, mut len: usize) {
        for segment in self.segments.iter_mut().rev() {
            if len == 0 {
                break;
            }
            let step = len.min(segment.current_line().len());
            segment.advance(step);
            len -= step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_gets_final_line_break() {
        let seg = InputSegment::source("a.tjp", "task".to_string());
        assert_eq!(seg.current_line(), "task\n");

        let seg = InputSegment::expansion("m", "x".to_string(), &SourcePosition::new("a.tjp", 4, 9));
        assert_eq!(seg.current_line(), "x");
        assert_eq!(seg.source_position(), SourcePosition::new("a.tjp", 4, 9));
    }

    #[test]
    fn test_advance_walks_lines() {
        let mut seg = InputSegment::source("a.tjp", "ab\ncd\n".to_string());
        seg.advance(1);
        assert_eq!(seg.current_line(), "b\n");
        seg.advance(2);
        assert_eq!(seg.current_line(), "cd\n");
        assert_eq!(seg.source_position().line, 2);
        assert_eq!(seg.source_position().column, 1);
        seg.advance(3);
        assert!(seg.is_exhausted());
        assert_eq!(seg.current_line(), "");
    }

    #[test]
    fn test_expansion_depth_and_current_macro() {
        let call = SourcePosition::new("a.tjp", 1, 1);
        let mut stack = SegmentStack::new();
        stack.push(InputSegment::source("a.tjp", "x\n".to_string()));
        stack.push(InputSegment::expansion("outer", "y".to_string(), &call));
        stack.push(InputSegment::source("inc.tji", "z\n".to_string()));
        stack.push(InputSegment::expansion("inner", "w".to_string(), &call));

        assert_eq!(stack.expansion_depth(), 2);
        assert_eq!(stack.current_macro(), Some("inner"));
        stack.pop();
        stack.pop();
        assert_eq!(stack.current_macro(), Some("outer"));
    }

    #[test]
    fn test_expansion_line_continues_in_caller() {
        let call = SourcePosition::new("a.tjp", 1, 1);
        let mut stack = SegmentStack::new();
        stack.push(InputSegment::source("a.tjp", "${m} tail\nnext\n".to_string()));
        stack.advance(4);
        stack.push(InputSegment::expansion("m", "one\ntwo".to_string(), &call));

        assert_eq!(stack.current_line(), "one\n");
        stack.advance(4);
        assert_eq!(stack.current_line(), "two tail\n");

        stack.advance(6);
        assert!(stack.top().map(InputSegment::is_exhausted).unwrap_or(false));
        assert_eq!(stack.current_line(), "il\n");
        stack.pop();
        assert_eq!(stack.top().map(|s| s.source_position().column), Some(8));
    }
}
