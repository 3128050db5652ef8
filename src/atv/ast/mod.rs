//! AST definitions and utilities for the ATV format
//!
//! ## Modules
//!
//! - `node` - node kinds, settings and values
//! - `document` - the document root with pragma, row and validation operations
//! - `position` - byte offset to line/column conversion for error reporting

pub mod document;
pub mod node;
pub mod position;

pub use document::Document;
pub use node::{
    Block, Comment, DocumentNode, NodeKind, Pragma, Row, RowId, RowRef, Setting, SimpleValue,
    Table, Value,
};
pub use position::{Position, SourceLocation};
