//! Scanner for TaskJuggler project files
//!
//! Turns `.tjp`/`.tji` text into a stream of typed tokens, expanding
//! `${name "arg"}` macro calls in place.

// Internal modules
#[macro_use]
pub mod logging;
pub mod config;
pub mod lexical;
pub mod timestamp;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use lexical::{
    tokenize_file, tokenize_str, MacroDefinition, Mode, RuleTable, ScanError, Scanner,
};
pub use timestamp::TjTime;
pub use tokens::{Token, TokenType, TokenValue};
pub use utils::SourcePosition;
