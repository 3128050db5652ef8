//! ATV text serialization
//!
//! Renders a [`Document`] back to ATV text. Every node type knows how to write
//! itself through [`WriteDocumentPart`]; the serializer only tracks the sink,
//! the dialect and the current nesting depth.
//!
//! ## Format
//!
//! - Two spaces of indentation per nesting level
//! - A blank line between top-level nodes of different kinds
//! - Compound values open `{` on the setting line and close `}` on a line of its own
//!
//! ```text
//! #version "8.1.0-default"
//!
//! // firewall
//!
//! FW_INCOMING = {
//!   {
//!     uid = "r1"
//!     ACTION = "accept"
//!   }
//! }
//! GATEWAY = { rowref = "r1" }
//! ```

use std::io::{self, Write};

use super::escape::quote;
use super::Dialect;
use crate::atv::ast::{Comment, Document, DocumentNode, Pragma, Row, Setting, Value};

/// Writes documents to an [`io::Write`] sink
pub struct AtvSerializer<W: Write> {
    sink: W,
    dialect: Dialect,
    indent_level: usize,
}

impl<W: Write> AtvSerializer<W> {
    pub fn new(sink: W, dialect: Dialect) -> Self {
        Self {
            sink,
            dialect,
            indent_level: 0,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn serialize(&mut self, document: &Document) -> io::Result<()> {
        document.write_part(self)?;
        self.sink.flush()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn indent(&self) -> String {
        "  ".repeat(self.indent_level)
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        let indent = self.indent();
        writeln!(self.sink, "{indent}{text}")
    }

    fn blank_line(&mut self) -> io::Result<()> {
        writeln!(self.sink)
    }

    fn quote(&self, value: &str) -> String {
        quote(value, self.dialect)
    }

    /// Write `opening`, the nested part one level deeper, then a closing brace.
    fn nested<F>(&mut self, opening: &str, body: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.write_line(opening)?;
        self.indent_level += 1;
        let result = body(self);
        self.indent_level -= 1;
        result?;
        self.write_line("}")
    }
}

/// A node that can render itself through an [`AtvSerializer`]
pub trait WriteDocumentPart {
    fn write_part<W: Write>(&self, serializer: &mut AtvSerializer<W>) -> io::Result<()>;
}

impl WriteDocumentPart for Document {
    fn write_part<W: Write>(&self, serializer: &mut AtvSerializer<W>) -> io::Result<()> {
        let mut last_kind = None;
        for node in self.nodes() {
            let kind = node.kind();
            if last_kind.is_some_and(|last| last != kind) {
                serializer.blank_line()?;
            }
            last_kind = Some(kind);
            node.write_part(serializer)?;
        }
        Ok(())
    }
}

impl WriteDocumentPart for DocumentNode {
    fn write_part<W: Write>(&self, serializer: &mut AtvSerializer<W>) -> io::Result<()> {
        match self {
            DocumentNode::Pragma(pragma) => pragma.write_part(serializer),
            DocumentNode::Comment(comment) => comment.write_part(serializer),
            DocumentNode::Setting(setting) => setting.write_part(serializer),
        }
    }
}

impl WriteDocumentPart for Pragma {
    fn write_part<W: Write>(&self, serializer: &mut AtvSerializer<W>) -> io::Result<()> {
        let line = format!("#{} {}", self.name, serializer.quote(&self.value));
        serializer.write_line(&line)
    }
}

impl WriteDocumentPart for Comment {
    fn write_part<W: Write>(&self, serializer: &mut AtvSerializer<W>) -> io::Result<()> {
        if self.text.is_empty() {
            serializer.write_line("//")
        } else {
            serializer.write_line(&format!("// {}", self.text))
        }
    }
}

impl WriteDocumentPart for Setting {
    fn write_part<W: Write>(&self, serializer: &mut AtvSerializer<W>) -> io::Result<()> {
        match &self.value {
            Value::Simple(simple) => {
                let line = format!("{} = {}", self.name, serializer.quote(simple.as_str()));
                serializer.write_line(&line)
            }
            Value::RowRef(reference) => {
                let line = format!(
                    "{} = {{ rowref = {} }}",
                    self.name,
                    serializer.quote(reference.as_str())
                );
                serializer.write_line(&line)
            }
            Value::Block(block) => serializer.nested(&format!("{} = {{", self.name), |s| {
                block
                    .settings
                    .iter()
                    .try_for_each(|setting| setting.write_part(s))
            }),
            Value::Table(table) => serializer.nested(&format!("{} = {{", self.name), |s| {
                table.rows.iter().try_for_each(|row| row.write_part(s))
            }),
        }
    }
}

impl WriteDocumentPart for Row {
    fn write_part<W: Write>(&self, serializer: &mut AtvSerializer<W>) -> io::Result<()> {
        serializer.nested("{", |s| {
            if let Some(id) = &self.id {
                let line = format!("uid = {}", s.quote(id.as_str()));
                s.write_line(&line)?;
            }
            self.settings
                .iter()
                .try_for_each(|setting| setting.write_part(s))
        })
    }
}
