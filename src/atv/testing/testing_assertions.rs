//! Fluent assertion API for ATV documents

use crate::atv::ast::{Block, Document, DocumentNode, NodeKind, Row, Setting, Table, Value};

// ============================================================================
// Entry Point
// ============================================================================

/// Create an assertion builder for a document
pub fn assert_document(doc: &Document) -> DocumentAssertion<'_> {
    DocumentAssertion { doc }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Simple(_) => "simple value",
        Value::RowRef(_) => "row reference",
        Value::Block(_) => "block",
        Value::Table(_) => "table",
    }
}

fn find_setting<'a>(settings: &'a [Setting], name: &str, context: &str) -> &'a Setting {
    settings
        .iter()
        .find(|setting| setting.name == name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = settings.iter().map(|s| s.name.as_str()).collect();
            panic!("{context}: no setting '{name}' (found [{}])", names.join(", "))
        })
}

// ============================================================================
// Document Assertions
// ============================================================================

pub struct DocumentAssertion<'a> {
    doc: &'a Document,
}

impl<'a> DocumentAssertion<'a> {
    /// Assert the kinds of all top-level nodes, in order
    pub fn kinds(self, expected: &[NodeKind]) -> Self {
        let actual: Vec<NodeKind> = self.doc.nodes().iter().map(DocumentNode::kind).collect();
        assert_eq!(actual, expected, "document node kinds differ");
        self
    }

    /// Assert the pragma `name` exists with `value`
    pub fn pragma(self, name: &str, value: &str) -> Self {
        let pragma = self
            .doc
            .pragma(name)
            .unwrap_or_else(|| panic!("document: no pragma '{name}'"));
        assert_eq!(pragma.value, value, "document: pragma '{name}'");
        self
    }

    /// Assert the texts of all top-level comments, in order
    pub fn comments(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self
            .doc
            .nodes()
            .iter()
            .filter_map(DocumentNode::as_comment)
            .map(|comment| comment.text.as_str())
            .collect();
        assert_eq!(actual, expected, "document comments differ");
        self
    }

    /// Assert the names of all top-level settings, in order
    pub fn setting_names(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.doc.settings().map(|s| s.name.as_str()).collect();
        assert_eq!(actual, expected, "document setting names differ");
        self
    }

    /// Assert on the value of top-level setting `name`
    pub fn setting<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(ValueAssertion<'a>),
    {
        let setting = self.doc.setting(name).unwrap_or_else(|| {
            let names: Vec<&str> = self.doc.settings().map(|s| s.name.as_str()).collect();
            panic!("document: no setting '{name}' (found [{}])", names.join(", "))
        });
        assertion(ValueAssertion {
            value: &setting.value,
            context: name.to_string(),
        });
        self
    }

    /// Assert top-level setting `name` is a simple value equal to `expected`
    pub fn simple(self, name: &str, expected: &str) -> Self {
        self.setting(name, |value| {
            value.simple(expected);
        })
    }
}

// ============================================================================
// Value Assertions
// ============================================================================

pub struct ValueAssertion<'a> {
    value: &'a Value,
    context: String,
}

impl<'a> ValueAssertion<'a> {
    pub fn simple(self, expected: &str) {
        match self.value {
            Value::Simple(simple) => {
                assert_eq!(simple.as_str(), expected, "{}: simple value", self.context)
            }
            other => panic!(
                "{}: expected simple value, found {}",
                self.context,
                describe(other)
            ),
        }
    }

    pub fn row_ref(self, expected: &str) {
        match self.value {
            Value::RowRef(reference) => {
                assert_eq!(reference.as_str(), expected, "{}: row reference", self.context)
            }
            other => panic!(
                "{}: expected row reference, found {}",
                self.context,
                describe(other)
            ),
        }
    }

    pub fn assert_table(self) -> TableAssertion<'a> {
        match self.value {
            Value::Table(table) => TableAssertion {
                table,
                context: self.context,
            },
            other => panic!("{}: expected table, found {}", self.context, describe(other)),
        }
    }

    pub fn assert_block(self) -> BlockAssertion<'a> {
        match self.value {
            Value::Block(block) => BlockAssertion {
                block,
                context: self.context,
            },
            other => panic!("{}: expected block, found {}", self.context, describe(other)),
        }
    }
}

// ============================================================================
// Table, Row and Block Assertions
// ============================================================================

pub struct TableAssertion<'a> {
    table: &'a Table,
    context: String,
}

impl<'a> TableAssertion<'a> {
    pub fn row_count(self, expected: usize) -> Self {
        assert_eq!(
            self.table.rows.len(),
            expected,
            "{}: row count",
            self.context
        );
        self
    }

    /// Assert the ids of all rows, `None` for rows without id
    pub fn row_ids(self, expected: &[Option<&str>]) -> Self {
        let actual: Vec<Option<&str>> = self
            .table
            .rows
            .iter()
            .map(|row| row.id.as_ref().map(|id| id.as_str()))
            .collect();
        assert_eq!(actual, expected, "{}: row ids", self.context);
        self
    }

    pub fn row<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(RowAssertion<'a>),
    {
        let row = self.table.rows.get(index).unwrap_or_else(|| {
            panic!(
                "{}: row index {} out of bounds (table has {} rows)",
                self.context,
                index,
                self.table.rows.len()
            )
        });
        assertion(RowAssertion {
            row,
            context: format!("{}[{}]", self.context, index),
        });
        self
    }
}

pub struct RowAssertion<'a> {
    row: &'a Row,
    context: String,
}

impl<'a> RowAssertion<'a> {
    pub fn id(self, expected: &str) -> Self {
        assert_eq!(
            self.row.id.as_ref().map(|id| id.as_str()),
            Some(expected),
            "{}: row id",
            self.context
        );
        self
    }

    pub fn no_id(self) -> Self {
        assert!(
            self.row.id.is_none(),
            "{}: expected row without id",
            self.context
        );
        self
    }

    pub fn setting_names(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.row.settings.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(actual, expected, "{}: setting names", self.context);
        self
    }

    pub fn setting<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(ValueAssertion<'a>),
    {
        let setting = find_setting(&self.row.settings, name, &self.context);
        assertion(ValueAssertion {
            value: &setting.value,
            context: format!("{}.{}", self.context, name),
        });
        self
    }

    pub fn simple(self, name: &str, expected: &str) -> Self {
        self.setting(name, |value| value.simple(expected))
    }
}

pub struct BlockAssertion<'a> {
    block: &'a Block,
    context: String,
}

impl<'a> BlockAssertion<'a> {
    pub fn setting_names(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self
            .block
            .settings
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(actual, expected, "{}: setting names", self.context);
        self
    }

    pub fn setting<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(ValueAssertion<'a>),
    {
        let setting = find_setting(&self.block.settings, name, &self.context);
        assertion(ValueAssertion {
            value: &setting.value,
            context: format!("{}.{}", self.context, name),
        });
        self
    }

    pub fn simple(self, name: &str, expected: &str) -> Self {
        self.setting(name, |value| value.simple(expected))
    }
}
