//! Overlaying an override file on a base file
//!
//! Rules, applied to a copy of the base:
//!
//! - both files must have the same version,
//! - override pragmas other than `version` replace or extend the base pragmas,
//! - top-level settings are matched by name; override-only settings go after the
//!   last base setting,
//! - tables merge row by row on the row id, unmatched override rows are appended;
//!   rows only match inside the table of the same name, so an id reused in
//!   another table is rejected as a duplicate,
//! - blocks merge recursively by setting name,
//! - any other pair of values is replaced by the override value,
//! - base comments stay where they are, override comments are not carried over.
//!
//! The merged document must pass [`Document::validate`].

use crate::atv::ast::{Block, Document, Row, Table, Value};
use crate::atv::error::MergeError;
use crate::atv::file::{File, VERSION_PRAGMA};

/// Merge `overrides` on top of `base`, producing a new file.
///
/// Without an override the result is a validated copy of `base`.
pub fn merge(base: &File, overrides: Option<&File>) -> Result<File, MergeError> {
    let mut merged = base.dupe();

    if let Some(overrides) = overrides {
        if base.version() != overrides.version() {
            return Err(MergeError::IncompatibleVersions {
                base_version: base.version().clone(),
                override_version: overrides.version().clone(),
            });
        }

        tracing::debug!(version = %base.version(), "merging override file");
        merged = merge_documents(merged, overrides.document());
    }

    merged.document().validate()?;
    Ok(merged)
}

fn merge_documents(base: File, overrides: &Document) -> File {
    let version = base.version().clone();
    let mut document = base.into_document();

    for pragma in overrides.pragmas() {
        if pragma.name != VERSION_PRAGMA {
            document.set_pragma(&pragma.name, pragma.value.clone());
        }
    }

    for setting in overrides.settings() {
        match document.setting_mut(&setting.name) {
            Some(existing) => {
                tracing::debug!(setting = %setting.name, "overriding setting");
                merge_value(&mut existing.value, &setting.value);
            }
            None => {
                tracing::debug!(setting = %setting.name, "adding setting");
                document.insert_setting(setting.clone());
            }
        }
    }

    File::stamped(document, &version)
}

fn merge_value(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Table(base), Value::Table(overrides)) => merge_tables(base, overrides),
        (Value::Block(base), Value::Block(overrides)) => merge_blocks(base, overrides),
        (base, overrides) => *base = overrides.clone(),
    }
}

fn merge_tables(base: &mut Table, overrides: &Table) {
    for row in &overrides.rows {
        match find_row_mut(base, row) {
            Some(existing) => *existing = row.clone(),
            None => base.rows.push(row.clone()),
        }
    }
}

fn find_row_mut<'a>(table: &'a mut Table, row: &Row) -> Option<&'a mut Row> {
    let id = row.id.as_ref()?;
    table
        .rows
        .iter_mut()
        .find(|candidate| candidate.id.as_ref() == Some(id))
}

fn merge_blocks(base: &mut Block, overrides: &Block) {
    for setting in &overrides.settings {
        match base
            .settings
            .iter_mut()
            .find(|existing| existing.name == setting.name)
        {
            Some(existing) => merge_value(&mut existing.value, &setting.value),
            None => base.settings.push(setting.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atv::ast::{NodeKind, RowId, RowRef, Setting};
    use crate::atv::error::StructureError;
    use crate::atv::version::Version;

    const BASE: &str = r#"#version "8.1.0-default"
#serial "base"
// firewall
FW_INCOMING = {
  {
    uid = "r1"
    ACTION = "accept"
  }
  {
    uid = "r2"
    ACTION = "drop"
  }
}
NTP = {
  ENABLED = "yes"
  SERVER = "pool.ntp.org"
}
HOSTNAME = "mguard"
"#;

    fn base() -> File {
        BASE.parse().unwrap()
    }

    fn overrides(body: &str) -> File {
        format!("#version \"8.1.0-default\"\n{body}").parse().unwrap()
    }

    fn table_ids(file: &File, name: &str) -> Vec<String> {
        file.document()
            .setting(name)
            .and_then(|s| s.value.as_table())
            .map(|t| {
                t.rows
                    .iter()
                    .map(|r| r.id.as_ref().map_or("-".to_string(), |id| id.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_merge_without_override_is_copy() {
        let base = base();
        assert_eq!(merge(&base, None).unwrap(), base);
    }

    #[test]
    fn test_merge_without_override_still_validates() {
        let base: File = "#version \"8.1.0-default\"\nREF = { rowref = \"r9\" }\n"
            .parse()
            .unwrap();
        assert_eq!(
            merge(&base, None).unwrap_err(),
            MergeError::Structure(StructureError::DanglingRowReference(RowRef::new("r9")))
        );
    }

    #[test]
    fn test_incompatible_versions() {
        let other: File = "#version \"8.0.2-default\"\n".parse().unwrap();
        assert_eq!(
            merge(&base(), Some(&other)).unwrap_err(),
            MergeError::IncompatibleVersions {
                base_version: Version::new(8, 1, 0, "default"),
                override_version: Version::new(8, 0, 2, "default"),
            }
        );
    }

    #[test]
    fn test_simple_setting_is_replaced_and_new_setting_appended() {
        let merged = merge(
            &base(),
            Some(&overrides("HOSTNAME = \"gateway\"\nDOMAIN = \"lan\"\n")),
        )
        .unwrap();

        let doc = merged.document();
        assert_eq!(doc.setting("HOSTNAME"), Some(&Setting::simple("HOSTNAME", "gateway")));
        let names: Vec<&str> = doc.settings().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["FW_INCOMING", "NTP", "HOSTNAME", "DOMAIN"]);
    }

    #[test]
    fn test_rows_are_replaced_in_place_and_new_rows_appended() {
        let merged = merge(
            &base(),
            Some(&overrides(
                "FW_INCOMING = {\n{\nuid = \"r3\"\nACTION = \"reject\"\n}\n{\nuid = \"r1\"\nACTION = \"log\"\n}\n{\nACTION = \"anon\"\n}\n}\n",
            )),
        )
        .unwrap();

        assert_eq!(table_ids(&merged, "FW_INCOMING"), vec!["r1", "r2", "r3", "-"]);
        let r1 = merged.document().row("r1").unwrap();
        assert_eq!(r1.setting("ACTION"), Some(&Setting::simple("ACTION", "log")));
    }

    #[test]
    fn test_blocks_merge_recursively() {
        let merged = merge(
            &base(),
            Some(&overrides("NTP = {\nSERVER = \"time.local\"\nPORT = \"123\"\n}\n")),
        )
        .unwrap();

        let ntp = merged.document().setting("NTP").and_then(|s| s.value.as_block()).unwrap();
        assert_eq!(
            ntp,
            &Block::new(vec![
                Setting::simple("ENABLED", "yes"),
                Setting::simple("SERVER", "time.local"),
                Setting::simple("PORT", "123"),
            ])
        );
    }

    #[test]
    fn test_mismatched_shapes_take_override() {
        let merged = merge(&base(), Some(&overrides("NTP = \"off\"\n"))).unwrap();
        assert_eq!(merged.document().setting("NTP"), Some(&Setting::simple("NTP", "off")));
    }

    #[test]
    fn test_pragmas_merge_but_version_stays() {
        let merged = merge(&base(), Some(&overrides("#serial \"override\"\n#model \"rs4000\"\n")))
            .unwrap();
        let pragmas: Vec<(&str, &str)> = merged
            .document()
            .pragmas()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(
            pragmas,
            vec![
                ("version", "8.1.0-default"),
                ("serial", "override"),
                ("model", "rs4000")
            ]
        );
    }

    #[test]
    fn test_override_comments_are_dropped() {
        let merged = merge(&base(), Some(&overrides("// from override\nHOSTNAME = \"x\"\n")))
            .unwrap();
        let comments: Vec<&str> = merged
            .document()
            .nodes()
            .iter()
            .filter_map(|n| n.as_comment())
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(comments, vec!["firewall"]);
    }

    #[test]
    fn test_duplicate_row_id_from_override_is_rejected() {
        let err = merge(
            &base(),
            Some(&overrides("OTHER = {\n{\nuid = \"r1\"\n}\n}\n")),
        )
        .unwrap_err();
        assert_eq!(
            err,
            MergeError::Structure(StructureError::DuplicateRowId(RowId::new("r1")))
        );
    }

    #[test]
    fn test_row_id_is_not_matched_across_tables() {
        let base: File = "#version \"8.1.0-default\"\nT1 = { { uid = \"r1\" A = \"1\" } }\nT2 = {}\n"
            .parse()
            .unwrap();
        let err = merge(&base, Some(&overrides("T2 = { { uid = \"r1\" A = \"2\" } }\n")))
            .unwrap_err();
        assert_eq!(
            err,
            MergeError::Structure(StructureError::DuplicateRowId(RowId::new("r1")))
        );
    }

    #[test]
    fn test_new_setting_goes_after_last_base_setting() {
        let base: File = "#version \"8.1.0-default\"\nA = \"1\"\n// trailing\n"
            .parse()
            .unwrap();
        let merged = merge(&base, Some(&overrides("B = \"2\"\n"))).unwrap();

        let kinds: Vec<NodeKind> = merged.document().nodes().iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Pragma, NodeKind::Setting, NodeKind::Setting, NodeKind::Comment]
        );
        insta::assert_snapshot!(
            merged.serialize(crate::atv::formats::Dialect::Atv).unwrap(),
            @r#"
        #version "8.1.0-default"

        A = "1"
        B = "2"

        // trailing
        "#
        );
    }

    #[test]
    fn test_reference_to_base_row_resolves() {
        let merged = merge(&base(), Some(&overrides("GW = { rowref = \"r2\" }\n"))).unwrap();
        assert!(merged.document().setting("GW").is_some());
    }

    #[test]
    fn test_inputs_are_untouched() {
        let base = base();
        let overrides = overrides("HOSTNAME = \"changed\"\n");
        let (base_before, overrides_before) = (base.clone(), overrides.clone());
        merge(&base, Some(&overrides)).unwrap();
        assert_eq!(base, base_before);
        assert_eq!(overrides, overrides_before);
    }
}
