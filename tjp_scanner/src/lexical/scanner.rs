//! The TJP scanner: rule dispatch over a stack of input segments
//!
//! `next_token` repeatedly matches the active mode's rules against the rest
//! of the current line of the topmost segment, continued into the caller's
//! line when an expansion ends without a line break. Suppressed matches loop
//! silently; a typed match becomes the returned token. A completed macro
//! call pushes its expansion and keeps looping.

use super::constructs::Construct;
use super::error::{ErrorSite, ScanError};
use super::macros::{MacroDefinition, MacroTable};
use super::rules::{default_rules, Action, Mode, RuleTable};
use super::segment::{InputSegment, SegmentStack};
use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::config::compile_time::lexical::MAX_TOKEN_COUNT;
use crate::config::runtime::{ConfigError, ScannerPreferences};
use crate::logging::{codes, service, Code, LogEvent, Logger};
use crate::tokens::{Token, TokenValue};
use crate::utils::{Position, SourcePosition};
use chrono::{FixedOffset, Offset, Utc};
use std::path::Path;
use std::sync::Arc;

/// Counters collected while scanning
#[derive(Debug, Default, Clone)]
pub struct ScanMetrics {
    pub tokens: usize,
    pub suppressed_matches: usize,
    pub macro_expansions: usize,
    pub max_expansion_depth: usize,
    pub included_sources: usize,
    pub warnings: usize,
}

impl ScanMetrics {
    pub(crate) fn record_expansion(&mut self, depth: usize) {
        self.macro_expansions += 1;
        self.max_expansion_depth = self.max_expansion_depth.max(depth);
    }
}

pub struct Scanner {
    rules: Arc<RuleTable>,
    pub(super) segments: SegmentStack,
    pub(super) mode: Mode,
    pub(super) construct: Construct,
    pub(super) macros: MacroTable,
    pub(super) preferences: ScannerPreferences,
    pub(super) reference_offset: FixedOffset,
    pub(super) metrics: ScanMetrics,
    handler: Arc<dyn Logger>,
    /// Start of the current match and the macro it was read from
    match_start: SourcePosition,
    match_macro: Option<String>,
    pushed_back: Vec<Token>,
    last_token_position: Option<SourcePosition>,
    end_position: SourcePosition,
    end_reported: bool,
    iteration_done: bool,
}

impl Scanner {
    /// Scanner over in-memory source text
    pub fn new(file: &str, text: impl Into<String>, handler: Arc<dyn Logger>) -> Self {
        let preferences = ScannerPreferences::default();
        let reference_offset = preferences.reference_offset().unwrap_or_else(|e| {
            log_warning!("Ignoring reference UTC offset", "error" => e);
            Utc.fix()
        });

        let mut segments = SegmentStack::new();
        segments.push(InputSegment::source(file, text.into()));
        let start = SourcePosition::at(file, Position::start());

        Self {
            rules: default_rules(),
            segments,
            mode: Mode::Main,
            construct: Construct::None,
            macros: MacroTable::new(),
            preferences,
            reference_offset,
            metrics: ScanMetrics::default(),
            handler,
            match_start: start.clone(),
            match_macro: None,
            pushed_back: Vec::new(),
            last_token_position: None,
            end_position: start,
            end_reported: false,
            iteration_done: false,
        }
    }

    /// Scanner over a file, reporting to the configured console handler
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        Self::from_file_with_handler(path, service::create_default_handler())
    }

    pub fn from_file_with_handler<P: AsRef<Path>>(
        path: P,
        handler: Arc<dyn Logger>,
    ) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        match read_source(path) {
            Ok(text) => Ok(Self::new(&name, text, handler)),
            Err(err) => {
                report_to(handler.as_ref(), &err);
                Err(err)
            }
        }
    }

    /// Replace the preferences; the reference offset must parse
    pub fn with_preferences(mut self, preferences: ScannerPreferences) -> Result<Self, ConfigError> {
        self.reference_offset = preferences.reference_offset()?;
        self.preferences = preferences;
        Ok(self)
    }

    /// Scan with a different rule table
    pub fn with_rules(mut self, rules: Arc<RuleTable>) -> Self {
        self.rules = rules;
        self
    }

    // ------------------------------------------------------------------
    // Token interface
    // ------------------------------------------------------------------

    /// Next visible token; after the end of input this keeps returning EOF
    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        if let Some(token) = self.pushed_back.pop() {
            self.last_token_position = Some(token.position.clone());
            return Ok(token);
        }

        match self.scan_token() {
            Ok(token) => {
                self.last_token_position = Some(token.position.clone());
                Ok(token)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Push a token back; the next `next_token` call returns it first
    pub fn return_token(&mut self, token: Token) {
        self.pushed_back.push(token);
    }

    /// Start of the most recently returned token, or the read position
    pub fn source_position(&self) -> SourcePosition {
        if let Some(position) = &self.last_token_position {
            return position.clone();
        }
        self.segments
            .top()
            .map(InputSegment::source_position)
            .unwrap_or_else(|| self.end_position.clone())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    // ------------------------------------------------------------------
    // Macros and included sources
    // ------------------------------------------------------------------

    /// Bind a macro; a previous definition of the same name is replaced
    pub fn add_macro(&mut self, definition: MacroDefinition) {
        let name = definition.name.clone();
        if self.macros.add(definition).is_some() {
            log_debug!("Macro redefined", "name" => name);
        }
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn macros_mut(&mut self) -> &mut MacroTable {
        &mut self.macros
    }

    /// Continue scanning in `text`, then resume after the current point
    pub fn include_source(&mut self, file: &str, text: impl Into<String>) {
        log_debug!("Including source", "file" => file, "depth" => self.segments.len());
        self.segments.push(InputSegment::source(file, text.into()));
        self.metrics.included_sources += 1;
    }

    pub fn include_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ScanError> {
        let path = path.as_ref();
        match read_source(path) {
            Ok(text) => {
                self.include_source(&path.display().to_string(), text);
                Ok(())
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Report a recoverable problem at the current token
    pub fn warning(&mut self, code: Code, message: &str) {
        let position = self.source_position();
        self.warning_at(code, message, position);
    }

    pub(super) fn warning_at(&mut self, code: Code, message: &str, position: SourcePosition) {
        self.metrics.warnings += 1;
        self.handler
            .log(&LogEvent::warning_with_code(code, message).with_position(position));
    }

    /// Report a parser error at the current token and hand it back for propagation
    pub fn error(&mut self, code: Code, message: &str) -> ScanError {
        let err = ScanError::Parser {
            code,
            message: message.to_string(),
            site: ErrorSite::new(
                self.source_position(),
                self.segments.current_macro().map(String::from),
            ),
        };
        self.report(&err);
        err
    }

    fn report(&self, err: &ScanError) {
        report_to(self.handler.as_ref(), err);
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    pub(super) fn match_site(&self) -> ErrorSite {
        ErrorSite::new(self.match_start.clone(), self.match_macro.clone())
    }

    pub(super) fn set_mode(&mut self, mode: Mode) {
        if self.preferences.trace_mode_switches && mode != self.mode {
            log_debug!("Mode switch",
                "from" => self.mode,
                "to" => mode,
                "position" => &self.match_start
            );
        }
        self.mode = mode;
    }

    /// Pop segments that have been read to the end; false once nothing is left
    fn drop_exhausted_segments(&mut self) -> bool {
        while let Some(top) = self.segments.top() {
            if !top.is_exhausted() {
                return true;
            }
            if let Some(segment) = self.segments.pop() {
                self.end_position = segment.source_position();
                log_debug!("Segment finished",
                    "file" => segment.file(),
                    "macro" => segment.macro_name().unwrap_or("-")
                );
            }
        }
        false
    }

    fn scan_token(&mut self) -> Result<Token, ScanError> {
        let rules = Arc::clone(&self.rules);

        loop {
            if !self.drop_exhausted_segments() {
                return self.end_of_input();
            }

            let (rule, text) = {
                let Some(segment) = self.segments.top() else {
                    return self.end_of_input();
                };
                let line = self.segments.current_line();

                let found = rules
                    .rules_for(self.mode)
                    .iter()
                    .find_map(|rule| rule.match_len(&line).map(|len| (rule, len)));

                let Some((rule, len)) = found else {
                    return Err(ScanError::MalformedInput {
                        character: line.chars().next().unwrap_or('\n'),
                        site: ErrorSite::new(
                            segment.source_position(),
                            segment.macro_name().map(String::from),
                        ),
                    });
                };

                self.match_start = segment.source_position();
                self.match_macro = segment.macro_name().map(String::from);
                (rule, line[..len].to_string())
            };

            self.segments.advance(text.len());

            let action = match rule.converter {
                Some(convert) => convert(self, &text)?,
                None => Action::Emit(TokenValue::Str(text)),
            };

            let (kind, value, position) = match (rule.token_type, action) {
                (Some(kind), Action::Emit(value)) => (kind, value, self.match_start.clone()),
                (Some(kind), Action::EmitAt(value, position)) => (kind, value, position),
                _ => {
                    self.metrics.suppressed_matches += 1;
                    continue;
                }
            };

            self.metrics.tokens += 1;
            if self.metrics.tokens > MAX_TOKEN_COUNT {
                return Err(ScanError::TooManyTokens {
                    count: self.metrics.tokens,
                    site: ErrorSite::new(position, self.match_macro.clone()),
                });
            }

            return Ok(Token::new(kind, value, position));
        }
    }

    fn end_of_input(&mut self) -> Result<Token, ScanError> {
        if self.mode != Mode::Main {
            let site = self
                .construct
                .start()
                .cloned()
                .unwrap_or_else(|| ErrorSite::new(self.end_position.clone(), None));
            return Err(ScanError::UnterminatedConstruct {
                construct: self.construct.description(),
                site,
            });
        }

        if !self.end_reported {
            self.end_reported = true;
            log_success!(codes::success::TOKENIZATION_COMPLETE, "Reached end of input",
                "file" => &self.end_position.file,
                "tokens" => self.metrics.tokens,
                "macro_expansions" => self.metrics.macro_expansions
            );
        }

        Ok(Token::eof(self.end_position.clone()))
    }
}

impl Iterator for Scanner {
    type Item = Result<Token, ScanError>;

    /// Yields every token including the final EOF, or stops after the first error
    fn next(&mut self) -> Option<Self::Item> {
        if self.iteration_done {
            return None;
        }

        let result = self.next_token();
        if !matches!(&result, Ok(token) if !token.is_eof()) {
            self.iteration_done = true;
        }
        Some(result)
    }
}

fn report_to(handler: &dyn Logger, err: &ScanError) {
    let mut event = LogEvent::error(err.error_code(), &err.to_string());
    if let Some(position) = err.position() {
        event = event.with_position(position.clone());
    }
    handler.log(&event);
}

/// Read a whole source file, enforcing the size limit and UTF-8
pub fn read_source(path: &Path) -> Result<String, ScanError> {
    let name = path.display().to_string();

    let size = std::fs::metadata(path)
        .map_err(|e| ScanError::from_io(&name, e))?
        .len();
    if size > MAX_FILE_SIZE {
        return Err(ScanError::FileTooLarge { path: name, size });
    }

    let bytes = std::fs::read(path).map_err(|e| ScanError::from_io(&name, e))?;
    String::from_utf8(bytes).map_err(|_| ScanError::InvalidEncoding { path: name })
}
