//! Main module for ATV library functionality

pub mod ast;
pub mod error;
pub mod file;
pub mod formats;
pub mod lexer;
pub mod merge;
pub mod migration;
pub mod parser;
pub mod testing;
pub mod version;
