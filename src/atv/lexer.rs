//! Lexer module for the ATV format
//!
//! This module contains the tokenization logic for the ATV format,
//! including token definitions and the lexer implementation.
//!
//! ATV is whitespace-insignificant outside of quoted strings, so unlike
//! indentation-based formats there is no token transformation pass: the logos
//! token stream with byte spans is handed to the parser as-is.

pub mod lexer_impl;
pub mod tokens;

use std::ops::Range;

use crate::atv::error::ParseError;

pub use lexer_impl::tokenize;
pub use tokens::Token;

/// Main lexer function that returns tokens with their byte spans
pub fn lex(source: &str) -> Result<Vec<(Token, Range<usize>)>, ParseError> {
    tokenize(source)
}
