//! Document-level parser responsible for parsing an entire ATV document.

use chumsky::prelude::*;

use super::combinators::{comment, pragma, setting, ParserError};
use crate::atv::ast::{Comment, Document, DocumentNode};
use crate::atv::lexer::Token;

/// Parse a document
///
/// Pragmas may only appear before the first comment or setting, so the parsed
/// node list always starts with the complete pragma block.
pub fn document() -> impl Parser<Token, Document, Error = ParserError> + Clone {
    let body_node = comment()
        .map(|text| DocumentNode::Comment(Comment::new(text)))
        .or(setting().map(DocumentNode::Setting));

    pragma()
        .map(DocumentNode::Pragma)
        .repeated()
        .then(body_node.repeated())
        .then_ignore(end())
        .map(|(mut nodes, body)| {
            nodes.extend(body);
            Document::from_nodes(nodes)
        })
}
