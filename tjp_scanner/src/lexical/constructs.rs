//! Multi-step constructs and the rule callbacks that build them
//!
//! A construct (string, comment, scissor block, macro body or macro call)
//! lives from the rule that opens it to the rule that closes it. Its
//! accumulated text and start position are kept in [`Construct`], which is
//! replaced as a whole when the construct ends.

use super::converters;
use super::error::{ErrorSite, ScanError};
use super::macros::parse_call;
use super::rules::{Action, Mode};
use super::scanner::Scanner;
use super::segment::InputSegment;
use crate::config::compile_time::lexical::{MAX_MACRO_ARGUMENTS, MAX_STRING_SIZE};
use crate::logging::codes;
use crate::timestamp::TjTime;
use crate::tokens::TokenValue;

#[derive(Debug, Default)]
pub enum Construct {
    #[default]
    None,
    Comment {
        start: ErrorSite,
    },
    Str {
        start: ErrorSite,
        quote: char,
        text: String,
    },
    Scissor {
        start: ErrorSite,
        indent: String,
        text: String,
    },
    MacroDef {
        start: ErrorSite,
        body: String,
    },
    MacroCall {
        start: ErrorSite,
        text: String,
    },
}

impl Construct {
    pub fn start(&self) -> Option<&ErrorSite> {
        match self {
            Construct::None => None,
            Construct::Comment { start }
            | Construct::Str { start, .. }
            | Construct::Scissor { start, .. }
            | Construct::MacroDef { start, .. }
            | Construct::MacroCall { start, .. } => Some(start),
        }
    }

    /// Name used in "Unterminated ..." messages
    pub fn description(&self) -> &'static str {
        match self {
            Construct::None => "input",
            Construct::Comment { .. } => "comment",
            Construct::Str { .. } => "string",
            Construct::Scissor { .. } => "scissor string",
            Construct::MacroDef { .. } => "macro definition",
            Construct::MacroCall { .. } => "macro call",
        }
    }
}

fn check_size(text: &str, start: &ErrorSite) -> Result<(), ScanError> {
    if text.len() > MAX_STRING_SIZE {
        return Err(ScanError::StringTooLarge {
            size: text.len(),
            site: start.clone(),
        });
    }
    Ok(())
}

impl Scanner {
    // ------------------------------------------------------------------
    // Literal values
    // ------------------------------------------------------------------

    pub(crate) fn convert_integer(&mut self, text: &str) -> Result<Action, ScanError> {
        converters::to_integer(text)
            .map(|i| Action::Emit(TokenValue::Integer(i)))
            .ok_or_else(|| ScanError::InvalidNumber {
                text: text.to_string(),
                site: self.match_site(),
            })
    }

    pub(crate) fn convert_float(&mut self, text: &str) -> Result<Action, ScanError> {
        converters::to_float(text)
            .map(|x| Action::Emit(TokenValue::Float(x)))
            .ok_or_else(|| ScanError::InvalidNumber {
                text: text.to_string(),
                site: self.match_site(),
            })
    }

    pub(crate) fn convert_time(&mut self, text: &str) -> Result<Action, ScanError> {
        converters::to_time(text)
            .map(|t| Action::Emit(TokenValue::Time(t)))
            .ok_or_else(|| ScanError::InvalidNumber {
                text: text.to_string(),
                site: self.match_site(),
            })
    }

    pub(crate) fn convert_date(&mut self, text: &str) -> Result<Action, ScanError> {
        TjTime::parse(text, self.reference_offset)
            .map(|d| Action::Emit(TokenValue::Date(d)))
            .map_err(|e| ScanError::InvalidDate {
                reason: e.to_string(),
                site: self.match_site(),
            })
    }

    pub(crate) fn convert_id_with_colon(&mut self, text: &str) -> Result<Action, ScanError> {
        Ok(Action::Emit(TokenValue::Str(
            converters::chop_colon(text).to_string(),
        )))
    }

    pub(crate) fn convert_macro(&mut self, text: &str) -> Result<Action, ScanError> {
        Ok(Action::Emit(TokenValue::Str(
            converters::chop_macro(text).to_string(),
        )))
    }

    // ------------------------------------------------------------------
    // C style comments
    // ------------------------------------------------------------------

    pub(crate) fn start_comment(&mut self, _text: &str) -> Result<Action, ScanError> {
        self.construct = Construct::Comment {
            start: self.match_site(),
        };
        self.set_mode(Mode::CStyleComment);
        Ok(Action::Skip)
    }

    pub(crate) fn end_comment(&mut self, _text: &str) -> Result<Action, ScanError> {
        self.construct = Construct::None;
        self.set_mode(Mode::Main);
        Ok(Action::Skip)
    }

    // ------------------------------------------------------------------
    // Quoted strings
    // ------------------------------------------------------------------

    fn start_string(&mut self, text: &str, quote: char, mode: Mode) -> Result<Action, ScanError> {
        let start = self.match_site();
        let content = converters::unescape(&text[quote.len_utf8()..], quote);
        check_size(&content, &start)?;

        self.construct = Construct::Str {
            start,
            quote,
            text: content,
        };
        self.set_mode(mode);
        Ok(Action::Skip)
    }

    pub(crate) fn start_dq_string(&mut self, text: &str) -> Result<Action, ScanError> {
        self.start_string(text, '"', Mode::DoubleQuotedString)
    }

    pub(crate) fn start_sq_string(&mut self, text: &str) -> Result<Action, ScanError> {
        self.start_string(text, '\'', Mode::SingleQuotedString)
    }

    /// Take the open string construct, or start one at the current match
    fn take_string(&mut self) -> (ErrorSite, char, String) {
        match std::mem::take(&mut self.construct) {
            Construct::Str { start, quote, text } => (start, quote, text),
            _ => {
                let quote = match self.mode {
                    Mode::SingleQuotedString => '\'',
                    _ => '"',
                };
                (self.match_site(), quote, String::new())
            }
        }
    }

    pub(crate) fn mid_string(&mut self, line: &str) -> Result<Action, ScanError> {
        let (start, quote, mut text) = self.take_string();
        text.push_str(&converters::unescape(line, quote));
        check_size(&text, &start)?;

        self.construct = Construct::Str { start, quote, text };
        Ok(Action::Skip)
    }

    pub(crate) fn end_string(&mut self, fragment: &str) -> Result<Action, ScanError> {
        let (start, quote, mut text) = self.take_string();
        let body = fragment.strip_suffix(quote).unwrap_or(fragment);
        text.push_str(&converters::unescape(body, quote));
        check_size(&text, &start)?;

        self.set_mode(Mode::Main);
        Ok(Action::EmitAt(TokenValue::Str(text), start.position))
    }

    // ------------------------------------------------------------------
    // Scissor strings
    // ------------------------------------------------------------------

    pub(crate) fn start_scissor(&mut self, text: &str) -> Result<Action, ScanError> {
        let start = self.match_site();
        let junk = text.strip_prefix("-8<-").unwrap_or(text).trim();
        if !junk.is_empty() {
            self.warning_at(
                codes::lexical::MALFORMED_CUT_MARK,
                "The cut mark -8<- must be immediately followed by a line break",
                start.position.clone(),
            );
        }

        self.construct = Construct::Scissor {
            start,
            indent: String::new(),
            text: String::new(),
        };
        self.set_mode(Mode::ScissorFirstLine);
        Ok(Action::Skip)
    }

    pub(crate) fn first_scissor_line(&mut self, line: &str) -> Result<Action, ScanError> {
        let (line_indent, rest) = converters::split_indent(line);
        if let Construct::Scissor { start, indent, text } = &mut self.construct {
            *indent = line_indent.to_string();
            text.push_str(rest);
            check_size(text, start)?;
        }
        self.set_mode(Mode::ScissorBody);
        Ok(Action::Skip)
    }

    pub(crate) fn mid_scissor_line(&mut self, line: &str) -> Result<Action, ScanError> {
        if let Construct::Scissor { start, indent, text } = &mut self.construct {
            text.push_str(converters::strip_common_prefix(line, indent));
            check_size(text, start)?;
        }
        Ok(Action::Skip)
    }

    pub(crate) fn end_scissor(&mut self, _text: &str) -> Result<Action, ScanError> {
        let construct = std::mem::take(&mut self.construct);
        self.set_mode(Mode::Main);
        match construct {
            Construct::Scissor { start, text, .. } => {
                Ok(Action::EmitAt(TokenValue::Str(text), start.position))
            }
            _ => Ok(Action::Emit(TokenValue::Str(String::new()))),
        }
    }

    // ------------------------------------------------------------------
    // Macro definitions
    // ------------------------------------------------------------------

    pub(crate) fn start_macro_def(&mut self, text: &str) -> Result<Action, ScanError> {
        self.construct = Construct::MacroDef {
            start: self.match_site(),
            body: text.strip_prefix('[').unwrap_or(text).to_string(),
        };
        self.set_mode(Mode::MacroDefCapture);
        Ok(Action::Skip)
    }

    pub(crate) fn mid_macro_def(&mut self, line: &str) -> Result<Action, ScanError> {
        if let Construct::MacroDef { start, body } = &mut self.construct {
            body.push_str(line);
            check_size(body, start)?;
        }
        Ok(Action::Skip)
    }

    pub(crate) fn end_macro_def(&mut self, line: &str) -> Result<Action, ScanError> {
        let construct = std::mem::take(&mut self.construct);
        self.set_mode(Mode::Main);

        let last = line.strip_suffix("]\n").unwrap_or(line);
        match construct {
            Construct::MacroDef { start, mut body } => {
                body.push_str(last);
                check_size(&body, &start)?;
                Ok(Action::EmitAt(TokenValue::Str(body), start.position))
            }
            _ => Ok(Action::Emit(TokenValue::Str(last.to_string()))),
        }
    }

    // ------------------------------------------------------------------
    // Macro calls
    // ------------------------------------------------------------------

    pub(crate) fn start_macro_call(&mut self, text: &str) -> Result<Action, ScanError> {
        self.construct = Construct::MacroCall {
            start: self.match_site(),
            text: text.to_string(),
        };
        self.set_mode(Mode::MacroCallCapture);
        Ok(Action::Skip)
    }

    pub(crate) fn mid_macro_call(&mut self, line: &str) -> Result<Action, ScanError> {
        if let Construct::MacroCall { start, text } = &mut self.construct {
            text.push_str(line);
            check_size(text, start)?;
        }
        Ok(Action::Skip)
    }

    pub(crate) fn end_macro_call(&mut self, fragment: &str) -> Result<Action, ScanError> {
        let construct = std::mem::take(&mut self.construct);
        self.set_mode(Mode::Main);

        let (start, mut text) = match construct {
            Construct::MacroCall { start, text } => (start, text),
            _ => (self.match_site(), String::new()),
        };
        text.push_str(fragment);

        self.expand_macro(&text, start)?;
        Ok(Action::Skip)
    }

    /// Parse a complete call, substitute its arguments and push the result
    fn expand_macro(&mut self, call_text: &str, start: ErrorSite) -> Result<(), ScanError> {
        let call = parse_call(call_text).map_err(|malformed| ScanError::MalformedMacroArguments {
            name: malformed.name,
            remainder: malformed.remainder,
            site: start.clone(),
        })?;

        if call.arguments.len() > MAX_MACRO_ARGUMENTS {
            return Err(ScanError::TooManyMacroArguments {
                name: call.name,
                count: call.arguments.len(),
                max: MAX_MACRO_ARGUMENTS,
                site: start,
            });
        }

        let definition = match self.macros.get(&call.name) {
            Some(definition) => definition,
            None => {
                return Err(ScanError::UndefinedMacro {
                    name: call.name,
                    site: start,
                })
            }
        };

        let depth = self.segments.expansion_depth() + 1;
        if depth > self.preferences.effective_max_macro_depth() {
            return Err(ScanError::MacroExpansionTooDeep {
                name: call.name,
                depth,
                site: start,
            });
        }

        let expansion = definition.expand(&call.arguments);
        if self.preferences.trace_macro_expansions {
            log_debug!("Expanding macro",
                "name" => call.name.as_str(),
                "arguments" => call.arguments.len(),
                "depth" => depth,
                "position" => &start.position
            );
        }

        self.segments.push(InputSegment::expansion(
            &call.name,
            expansion,
            &start.position,
        ));
        self.metrics.record_expansion(depth);
        Ok(())
    }
}
