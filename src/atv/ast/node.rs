//! ATV node type definitions
//!
//! A document is a flat sequence of top-level [`DocumentNode`]s. Settings carry a
//! [`Value`], and block and table values nest further settings, so the tree can
//! be arbitrarily deep. Every node owns its children: `Clone` is a deep copy.

use serde::Serialize;
use std::fmt;

/// Kind tag of a top-level node, compared by value for output grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Pragma,
    Comment,
    Setting,
}

/// A top-level node of an ATV document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "node", rename_all = "snake_case")]
pub enum DocumentNode {
    Pragma(Pragma),
    Comment(Comment),
    Setting(Setting),
}

impl DocumentNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            DocumentNode::Pragma(_) => NodeKind::Pragma,
            DocumentNode::Comment(_) => NodeKind::Comment,
            DocumentNode::Setting(_) => NodeKind::Setting,
        }
    }

    pub fn as_pragma(&self) -> Option<&Pragma> {
        match self {
            DocumentNode::Pragma(pragma) => Some(pragma),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            DocumentNode::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn as_setting(&self) -> Option<&Setting> {
        match self {
            DocumentNode::Setting(setting) => Some(setting),
            _ => None,
        }
    }

    pub fn as_setting_mut(&mut self) -> Option<&mut Setting> {
        match self {
            DocumentNode::Setting(setting) => Some(setting),
            _ => None,
        }
    }

    pub(crate) fn collect_row_ids<'a>(&'a self, out: &mut Vec<&'a RowId>) {
        if let DocumentNode::Setting(setting) = self {
            setting.value.collect_row_ids(out);
        }
    }

    pub(crate) fn collect_row_references<'a>(&'a self, out: &mut Vec<&'a RowRef>) {
        if let DocumentNode::Setting(setting) = self {
            setting.value.collect_row_references(out);
        }
    }
}

/// A document-level directive, e.g. `#version "8.1.0-default"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pragma {
    pub name: String,
    pub value: String,
}

impl Pragma {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A top-level `//` comment. The text excludes the marker and is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A named value: `NAME = <value>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub name: String,
    pub value: Value,
}

impl Setting {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Shorthand for a setting holding a plain string.
    pub fn simple(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Value::Simple(SimpleValue::new(value)))
    }
}

/// The right-hand side of a setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Simple(SimpleValue),
    RowRef(RowRef),
    Block(Block),
    Table(Table),
}

impl Value {
    pub fn as_simple(&self) -> Option<&str> {
        match self {
            Value::Simple(simple) => Some(simple.as_str()),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Value::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_row_ref(&self) -> Option<&RowRef> {
        match self {
            Value::RowRef(reference) => Some(reference),
            _ => None,
        }
    }

    fn collect_row_ids<'a>(&'a self, out: &mut Vec<&'a RowId>) {
        match self {
            Value::Table(table) => {
                for row in &table.rows {
                    if let Some(id) = &row.id {
                        out.push(id);
                    }
                    for setting in &row.settings {
                        setting.value.collect_row_ids(out);
                    }
                }
            }
            Value::Block(block) => {
                for setting in &block.settings {
                    setting.value.collect_row_ids(out);
                }
            }
            Value::Simple(_) | Value::RowRef(_) => {}
        }
    }

    fn collect_row_references<'a>(&'a self, out: &mut Vec<&'a RowRef>) {
        match self {
            Value::RowRef(reference) => out.push(reference),
            Value::Table(table) => {
                for setting in table.rows.iter().flat_map(|row| &row.settings) {
                    setting.value.collect_row_references(out);
                }
            }
            Value::Block(block) => {
                for setting in &block.settings {
                    setting.value.collect_row_references(out);
                }
            }
            Value::Simple(_) => {}
        }
    }

    pub(crate) fn find_row(&self, id: &str) -> Option<&Row> {
        match self {
            Value::Table(table) => table.row(id).or_else(|| {
                table
                    .rows
                    .iter()
                    .flat_map(|row| &row.settings)
                    .find_map(|setting| setting.value.find_row(id))
            }),
            Value::Block(block) => block
                .settings
                .iter()
                .find_map(|setting| setting.value.find_row(id)),
            Value::Simple(_) | Value::RowRef(_) => None,
        }
    }
}

/// A leaf string literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SimpleValue(String);

impl SimpleValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A nested group of settings: `NAME = { A = "1" B = "2" }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Block {
    pub settings: Vec<Setting>,
}

impl Block {
    pub fn new(settings: Vec<Setting>) -> Self {
        Self { settings }
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|setting| setting.name == name)
    }
}

/// A list of rows: `NAME = { { ... } { ... } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Direct row with the given id (not searching nested tables)
    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows
            .iter()
            .find(|row| row.id.as_ref().is_some_and(|row_id| row_id.as_str() == id))
    }
}

/// One table row, optionally addressable through its [`RowId`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: Option<RowId>,
    pub settings: Vec<Setting>,
}

impl Row {
    pub fn new(id: Option<RowId>, settings: Vec<Setting>) -> Self {
        Self { id, settings }
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|setting| setting.name == name)
    }
}

/// Unique identifier of a row within a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference from one entry to another entry's [`RowId`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RowRef(String);

impl RowRef {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
