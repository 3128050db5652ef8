//! Parser module for the ATV format
//!
//! This module turns the token stream of the [lexer](crate::atv::lexer) into a
//! [`Document`]. The grammar is small enough for a single combinator parser:
//!
//! ```text
//! document  := pragma* ( comment | setting )* EOF
//! pragma    := '#' IDENT STRING
//! setting   := IDENT '=' value
//! value     := STRING
//!            | '{' 'rowref' '=' STRING '}'
//!            | '{' comment* ( setting comment* )+ '}'
//!            | '{' comment* ( row comment* )* '}'
//! row       := '{' comment* ( 'uid' '=' STRING )? ( comment* setting )* comment* '}'
//! ```
//!
//! Comments inside braces are accepted and dropped. `{}` is an empty table.
//! There is no error recovery: parsing stops at the first error.

pub mod api;
pub mod combinators;
pub mod document;

pub use api::parse;
pub use document::document;

use crate::atv::ast::Document;
use crate::atv::error::ParseError;

/// Main parser function that takes source text and returns a parsed document.
/// This is the primary entry point for parsing ATV documents.
pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    let tokens = crate::atv::lexer::lex(source)?;
    parse(tokens, source)
}
