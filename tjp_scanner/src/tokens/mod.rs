//! Token system for the TJP scanner
//!
//! - **[`TokenType`]** - the categories the parser matches on
//! - **[`TokenValue`]** - converted literal values (integers, floats,
//!   seconds since midnight, timestamps, text)
//! - **[`Token`]** - type, value and construct-start position

pub mod token;

pub use token::{Token, TokenType, TokenValue};

pub use crate::utils::SourcePosition;
