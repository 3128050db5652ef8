//! Public API for the parser.

use chumsky::{prelude::*, Stream};
use std::ops::Range;

use super::combinators::ParserError;
use super::document::document;
use crate::atv::ast::{Document, SourceLocation};
use crate::atv::error::ParseError;
use crate::atv::lexer::Token;

const END_OF_INPUT: &str = "end of input";

/// Parse tokens with their byte spans into a document.
///
/// `source` is only used to turn the error span into a line and column.
pub fn parse(tokens: Vec<(Token, Range<usize>)>, source: &str) -> Result<Document, ParseError> {
    let eoi = source.len()..source.len();
    let stream = Stream::from_iter(eoi, tokens.into_iter());

    document()
        .parse(stream)
        .map_err(|errors| to_parse_error(errors, source))
}

/// Convert the first chumsky error into a [`ParseError`].
fn to_parse_error(errors: Vec<ParserError>, source: &str) -> ParseError {
    let location = SourceLocation::new(source);

    let Some(error) = errors.into_iter().next() else {
        return ParseError::UnexpectedToken {
            position: location.byte_to_position(source.len()),
            expected: "a valid document".to_string(),
            found: END_OF_INPUT.to_string(),
        };
    };

    let mut expected: Vec<String> = error
        .expected()
        .map(|token| match token {
            Some(token) => token.to_string(),
            None => END_OF_INPUT.to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    ParseError::UnexpectedToken {
        position: location.byte_to_position(error.span().start),
        expected: if expected.is_empty() {
            "something else".to_string()
        } else {
            expected.join(" or ")
        },
        found: error
            .found()
            .map_or_else(|| END_OF_INPUT.to_string(), ToString::to_string),
    }
}
