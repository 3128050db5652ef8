//! Parser combinator functions for building the ATV parser.

use chumsky::prelude::*;

use crate::atv::ast::{Block, Pragma, Row, RowId, RowRef, Setting, SimpleValue, Table, Value};
use crate::atv::lexer::Token;

/// Type alias for parser error
pub(crate) type ParserError = Simple<Token>;

/// Helper: match a specific token, discarding it
pub(crate) fn token(t: Token) -> impl Parser<Token, (), Error = ParserError> + Clone {
    just(t).ignored()
}

pub(crate) fn identifier() -> impl Parser<Token, String, Error = ParserError> + Clone {
    select! { Token::Ident(name) => name }
}

pub(crate) fn string_literal() -> impl Parser<Token, String, Error = ParserError> + Clone {
    select! { Token::String(value) => value }
}

/// A comment, yielding its trimmed text
pub(crate) fn comment() -> impl Parser<Token, String, Error = ParserError> + Clone {
    select! { Token::Comment(text) => text }
}

/// Any run of comments, dropped. Used inside braces.
fn skip_comments() -> impl Parser<Token, (), Error = ParserError> + Clone {
    comment().repeated().ignored()
}

fn braced<P, O>(inner: P) -> impl Parser<Token, O, Error = ParserError> + Clone
where
    P: Parser<Token, O, Error = ParserError> + Clone,
{
    inner.delimited_by(token(Token::OpenBrace), token(Token::CloseBrace))
}

/// `#name "value"`
pub(crate) fn pragma() -> impl Parser<Token, Pragma, Error = ParserError> + Clone {
    token(Token::Hash)
        .ignore_then(identifier())
        .then(string_literal())
        .map(|(name, value)| Pragma::new(name, value))
}

/// `NAME = value`, with `value` supplied so it can recurse
fn setting_with<V>(value: V) -> impl Parser<Token, Setting, Error = ParserError> + Clone
where
    V: Parser<Token, Value, Error = ParserError> + Clone,
{
    identifier()
        .then_ignore(token(Token::Equals))
        .then(value)
        .map(|(name, value)| Setting::new(name, value))
}

/// `{ uid = "r1" NAME = value ... }`
fn row_with<S>(setting: S) -> impl Parser<Token, Row, Error = ParserError> + Clone
where
    S: Parser<Token, Setting, Error = ParserError> + Clone,
{
    let uid = token(Token::Uid)
        .ignore_then(token(Token::Equals))
        .ignore_then(string_literal())
        .map(RowId::new);

    braced(
        skip_comments()
            .ignore_then(uid.or_not())
            .then(skip_comments().ignore_then(setting).repeated())
            .then_ignore(skip_comments()),
    )
    .map(|(id, settings)| Row::new(id, settings))
}

/// The right-hand side of a setting.
///
/// Braced values are tried as row reference, then block, then table, so a
/// non-empty list of settings is a block and anything else in braces is a table.
pub(crate) fn value() -> impl Parser<Token, Value, Error = ParserError> + Clone {
    recursive(|value| {
        let setting = setting_with(value);

        let simple = string_literal().map(|text| Value::Simple(SimpleValue::new(text)));

        let row_ref = braced(
            token(Token::RowRef)
                .ignore_then(token(Token::Equals))
                .ignore_then(string_literal()),
        )
        .map(|target| Value::RowRef(RowRef::new(target)));

        let block = braced(
            skip_comments().ignore_then(
                setting
                    .clone()
                    .then_ignore(skip_comments())
                    .repeated()
                    .at_least(1),
            ),
        )
        .map(|settings| Value::Block(Block::new(settings)));

        let table = braced(
            skip_comments().ignore_then(row_with(setting).then_ignore(skip_comments()).repeated()),
        )
        .map(|rows| Value::Table(Table::new(rows)));

        choice((simple, row_ref, block, table))
    })
}

/// A setting at document level
pub(crate) fn setting() -> impl Parser<Token, Setting, Error = ParserError> + Clone {
    setting_with(value())
}
