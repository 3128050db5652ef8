//! Implementation of the ATV lexer
//!
//! This module provides convenience functions for tokenizing ATV text.
//! The actual tokenization is handled entirely by logos; this layer only
//! attaches spans and turns the first unrecognized input into a [`ParseError`].

use std::ops::Range;

use crate::atv::ast::SourceLocation;
use crate::atv::error::ParseError;
use crate::atv::lexer::tokens::Token;
use logos::Logos;

/// Tokenize a string, collecting tokens with their byte spans.
///
/// Lexing stops at the first invalid token (an unknown character, an unterminated
/// string or a bad escape sequence).
pub fn tokenize(source: &str) -> Result<Vec<(Token, Range<usize>)>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                let span = lexer.span();
                return Err(ParseError::InvalidToken {
                    position: SourceLocation::new(source).byte_to_position(span.start),
                    text: lexer.slice().to_string(),
                });
            }
        }
    }

    Ok(tokens)
}
