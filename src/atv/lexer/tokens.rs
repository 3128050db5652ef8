//! Token definitions for the ATV format
//!
//! This module defines all the tokens that can be produced by the ATV lexer.
//! The tokens are defined using the logos derive macro for efficient tokenization.
//! Whitespace between tokens is insignificant and skipped by logos itself;
//! it only matters inside quoted strings.
use logos::Logos;
use std::fmt;

use crate::atv::formats::escape::unquote;

/// All possible tokens in the ATV format
#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Pragma marker, as in `#version "8.1.0-default"`
    #[token("#")]
    Hash,

    #[token("=")]
    Equals,

    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,

    // Keywords win over identifiers of the same length
    #[token("uid")]
    Uid,
    #[token("rowref")]
    RowRef,

    // Line comment, text without the leading `//`
    #[regex(r"//[^\n]*", |lex| lex.slice()[2..].trim().to_string())]
    Comment(String),

    // Quoted string literal, already unescaped. Invalid escapes fail the lexer.
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    String(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Hash => write!(f, "'#'"),
            Token::Equals => write!(f, "'='"),
            Token::OpenBrace => write!(f, "'{{'"),
            Token::CloseBrace => write!(f, "'}}'"),
            Token::Uid => write!(f, "'uid'"),
            Token::RowRef => write!(f, "'rowref'"),
            Token::Comment(_) => write!(f, "comment"),
            Token::String(value) => write!(f, "string {:?}", value),
            Token::Ident(name) => write!(f, "identifier '{}'", name),
        }
    }
}
