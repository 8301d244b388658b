//! Shared position types used by the scanner, its tokens and its diagnostics.

pub mod span;

pub use span::{Position, SourcePosition};
