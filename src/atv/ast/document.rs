//! The document root and its structural operations
//!
//! [`Document`] keeps its node sequence private so the pragma block can only be
//! grown through [`Document::set_pragma`], which always inserts directly after
//! the last existing pragma. Settings and comments are appended at the end;
//! [`Document::insert_setting`] places a setting right after the last one.

use serde::Serialize;
use std::collections::HashSet;

use super::node::{Comment, DocumentNode, NodeKind, Pragma, Row, RowId, RowRef, Setting};
use crate::atv::error::StructureError;

/// Root of a parsed ATV document: an ordered sequence of top-level nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    nodes: Vec<DocumentNode>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from nodes already known to keep pragmas at the head.
    pub(crate) fn from_nodes(nodes: Vec<DocumentNode>) -> Self {
        debug_assert!(
            nodes
                .iter()
                .skip_while(|node| node.kind() == NodeKind::Pragma)
                .all(|node| node.kind() != NodeKind::Pragma),
            "pragmas must form a contiguous block at the head"
        );
        Self { nodes }
    }

    pub fn nodes(&self) -> &[DocumentNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Structural deep copy. The copy shares nothing with `self`.
    pub fn dupe(&self) -> Document {
        self.clone()
    }

    pub fn pragmas(&self) -> impl Iterator<Item = &Pragma> {
        self.nodes.iter().filter_map(DocumentNode::as_pragma)
    }

    /// Get the pragma with the specified name.
    pub fn pragma(&self, name: &str) -> Option<&Pragma> {
        self.pragmas().find(|pragma| pragma.name == name)
    }

    /// Set the pragma with the specified name.
    ///
    /// An existing pragma is updated in place. Otherwise a new pragma is inserted
    /// right after the last pragma, or at the very beginning if there is none.
    pub fn set_pragma(&mut self, name: &str, value: impl Into<String>) -> &Pragma {
        let value = value.into();
        let existing = self
            .nodes
            .iter()
            .position(|node| node.as_pragma().is_some_and(|pragma| pragma.name == name));

        let index = match existing {
            Some(index) => {
                if let DocumentNode::Pragma(pragma) = &mut self.nodes[index] {
                    pragma.value = value;
                }
                index
            }
            None => {
                let index = self
                    .nodes
                    .iter()
                    .rposition(|node| node.kind() == NodeKind::Pragma)
                    .map_or(0, |last| last + 1);
                self.nodes
                    .insert(index, DocumentNode::Pragma(Pragma::new(name, value)));
                index
            }
        };

        match &self.nodes[index] {
            DocumentNode::Pragma(pragma) => pragma,
            _ => unreachable!("set_pragma index always points at a pragma"),
        }
    }

    pub fn settings(&self) -> impl Iterator<Item = &Setting> {
        self.nodes.iter().filter_map(DocumentNode::as_setting)
    }

    /// Top-level setting with the specified name
    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings().find(|setting| setting.name == name)
    }

    pub fn setting_mut(&mut self, name: &str) -> Option<&mut Setting> {
        self.nodes
            .iter_mut()
            .filter_map(DocumentNode::as_setting_mut)
            .find(|setting| setting.name == name)
    }

    pub fn push_setting(&mut self, setting: Setting) {
        self.nodes.push(DocumentNode::Setting(setting));
    }

    /// Insert a setting directly after the last top-level setting.
    ///
    /// Without any setting it goes to the end of the document.
    pub fn insert_setting(&mut self, setting: Setting) {
        let index = self
            .nodes
            .iter()
            .rposition(|node| node.kind() == NodeKind::Setting)
            .map_or(self.nodes.len(), |last| last + 1);
        self.nodes.insert(index, DocumentNode::Setting(setting));
    }

    pub fn push_comment(&mut self, comment: Comment) {
        self.nodes.push(DocumentNode::Comment(comment));
    }

    /// Find the row with the given id at any nesting level.
    pub fn row(&self, id: &str) -> Option<&Row> {
        self.settings()
            .find_map(|setting| setting.value.find_row(id))
    }

    /// All row ids, recursively and in document order.
    pub fn row_ids(&self) -> Vec<&RowId> {
        let mut ids = Vec::new();
        for node in &self.nodes {
            node.collect_row_ids(&mut ids);
        }
        ids
    }

    /// All row references, recursively and in document order.
    pub fn row_references(&self) -> Vec<&RowRef> {
        let mut refs = Vec::new();
        for node in &self.nodes {
            node.collect_row_references(&mut refs);
        }
        refs
    }

    /// Check that row ids are unique and every row reference resolves.
    ///
    /// Reports the first duplicate id, then the first dangling reference, both
    /// in document order.
    pub fn validate(&self) -> Result<(), StructureError> {
        let mut seen = HashSet::new();
        for id in self.row_ids() {
            if !seen.insert(id.as_str()) {
                return Err(StructureError::DuplicateRowId(id.clone()));
            }
        }

        match self
            .row_references()
            .into_iter()
            .find(|reference| !seen.contains(reference.as_str()))
        {
            Some(dangling) => Err(StructureError::DanglingRowReference(dangling.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atv::ast::{Row, Table, Value};

    fn document_with_rows(rows: Vec<Row>) -> Document {
        let mut doc = Document::new();
        doc.set_pragma("version", "8.0.2-default");
        doc.push_setting(Setting::new("FW_INCOMING", Value::Table(Table::new(rows))));
        doc
    }

    fn row(id: &str, settings: Vec<Setting>) -> Row {
        Row::new(Some(RowId::new(id)), settings)
    }

    fn reference(name: &str, target: &str) -> Setting {
        Setting::new(name, Value::RowRef(RowRef::new(target)))
    }

    fn kinds(doc: &Document) -> Vec<NodeKind> {
        doc.nodes().iter().map(DocumentNode::kind).collect()
    }

    #[test]
    fn test_set_pragma_on_empty_document() {
        let mut doc = Document::new();
        let pragma = doc.set_pragma("version", "8.0.2-default");
        assert_eq!(pragma, &Pragma::new("version", "8.0.2-default"));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_set_pragma_inserts_after_last_pragma() {
        let mut doc = Document::new();
        doc.set_pragma("version", "8.0.2-default");
        doc.push_comment(Comment::new("header"));
        doc.push_setting(Setting::simple("A", "1"));

        doc.set_pragma("serial", "123");

        assert_eq!(
            kinds(&doc),
            vec![
                NodeKind::Pragma,
                NodeKind::Pragma,
                NodeKind::Comment,
                NodeKind::Setting
            ]
        );
        let names: Vec<&str> = doc.pragmas().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["version", "serial"]);
    }

    #[test]
    fn test_set_pragma_without_any_pragma_goes_first() {
        let mut doc = Document::new();
        doc.push_setting(Setting::simple("A", "1"));
        doc.set_pragma("version", "8.0.2-default");
        assert_eq!(kinds(&doc), vec![NodeKind::Pragma, NodeKind::Setting]);
    }

    #[test]
    fn test_set_pragma_updates_in_place() {
        let mut doc = Document::new();
        doc.set_pragma("version", "8.0.2-default");
        doc.set_pragma("serial", "123");
        doc.set_pragma("version", "8.1.0-default");

        assert_eq!(doc.len(), 2);
        assert_eq!(
            doc.pragma("version").map(|p| p.value.as_str()),
            Some("8.1.0-default")
        );
        assert_eq!(doc.nodes()[0].as_pragma().map(|p| p.name.as_str()), Some("version"));
    }

    #[test]
    fn test_set_pragma_is_idempotent() {
        let mut doc = document_with_rows(vec![]);
        doc.set_pragma("version", "8.1.0-default");
        let once = doc.clone();
        doc.set_pragma("version", "8.1.0-default");
        assert_eq!(doc, once);
    }

    #[test]
    fn test_dupe_is_isolated() {
        let original = document_with_rows(vec![row("r1", vec![Setting::simple("A", "1")])]);
        let mut copy = original.dupe();
        copy.set_pragma("x", "1");
        if let Some(setting) = copy.setting_mut("FW_INCOMING") {
            setting.value = Value::Table(Table::default());
        }

        assert!(original.pragma("x").is_none());
        assert!(original.row("r1").is_some());
        assert!(copy.row("r1").is_none());
    }

    #[test]
    fn test_validate_accepts_resolved_references() {
        let doc = document_with_rows(vec![
            row("r1", vec![reference("NEXT", "r2")]),
            row("r2", vec![reference("PREV", "r1")]),
        ]);
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let doc = document_with_rows(vec![row("r1", vec![]), row("r1", vec![])]);
        assert_eq!(
            doc.validate(),
            Err(StructureError::DuplicateRowId(RowId::new("r1")))
        );
    }

    #[test]
    fn test_validate_rejects_dangling_reference() {
        let doc = document_with_rows(vec![row("r1", vec![reference("NEXT", "r9")])]);
        assert_eq!(
            doc.validate(),
            Err(StructureError::DanglingRowReference(RowRef::new("r9")))
        );
    }

    #[test]
    fn test_insert_setting_goes_after_last_setting() {
        let mut doc = document_with_rows(vec![]);
        doc.push_comment(Comment::new("trailing"));
        doc.insert_setting(Setting::simple("HOSTNAME", "gw"));

        assert_eq!(
            kinds(&doc),
            vec![NodeKind::Pragma, NodeKind::Setting, NodeKind::Setting, NodeKind::Comment]
        );
        let names: Vec<&str> = doc.settings().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["FW_INCOMING", "HOSTNAME"]);
    }

    #[test]
    fn test_insert_setting_without_settings_appends() {
        let mut doc = Document::new();
        doc.set_pragma("version", "8.0.2-default");
        doc.push_comment(Comment::new("only a comment"));
        doc.insert_setting(Setting::simple("A", "1"));

        assert_eq!(
            kinds(&doc),
            vec![NodeKind::Pragma, NodeKind::Comment, NodeKind::Setting]
        );
    }

    #[test]
    fn test_setting_lookup() {
        let mut doc = document_with_rows(vec![]);
        doc.push_setting(Setting::simple("NTP_ENABLED", "no"));
        assert_eq!(
            doc.setting("NTP_ENABLED").and_then(|s| s.value.as_simple()),
            Some("no")
        );
        assert!(doc.setting("MISSING").is_none());
    }

    #[test]
    fn test_ids_and_references_are_collected_recursively() {
        let doc = crate::atv::parser::parse_document(
            r#"A = { { uid = "r1" NEXT = { rowref = "n1" } } }
B = { INNER = { { uid = "n1" BACK = { rowref = "r1" } } } }
C = { rowref = "r1" }
"#,
        )
        .unwrap();

        let ids: Vec<&str> = doc.row_ids().into_iter().map(RowId::as_str).collect();
        let refs: Vec<&str> = doc.row_references().into_iter().map(RowRef::as_str).collect();
        assert_eq!(ids, ["r1", "n1"]);
        assert_eq!(refs, ["n1", "r1", "r1"]);
        assert!(doc.row("n1").is_some());
        assert_eq!(doc.validate(), Ok(()));
    }
}
