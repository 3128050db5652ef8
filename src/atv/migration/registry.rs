//! Validated table of migrations and the chain resolver

use std::cmp::Ordering;
use std::collections::HashMap;

use super::{Migration, MigrationStep};
use crate::atv::error::{MigrationError, RegistryError};
use crate::atv::file::File;
use crate::atv::version::Version;

/// Immutable, validated set of migrations keyed by their source version.
///
/// Invariants checked by [`MigrationRegistry::new`]:
/// - no two migrations start at the same version,
/// - every migration strictly advances the release number, so no chain can cycle,
/// - every chain ends at the declared latest version.
#[derive(Debug, Clone)]
pub struct MigrationRegistry {
    by_source: HashMap<Version, Migration>,
    latest: Version,
}

impl MigrationRegistry {
    pub fn new(migrations: Vec<Migration>, latest: Version) -> Result<Self, RegistryError> {
        let mut by_source: HashMap<Version, Migration> = HashMap::new();

        for migration in migrations {
            let (from, to) = (migration.from_version(), migration.to_version());
            if to.release_cmp(from) != Ordering::Greater {
                return Err(RegistryError::NotAdvancing {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
            if by_source.contains_key(from) {
                return Err(RegistryError::DuplicateSource(from.clone()));
            }
            by_source.insert(from.clone(), migration);
        }

        let mut starts: Vec<&Version> = by_source.keys().collect();
        starts.sort_by(|a, b| a.release_cmp(b).then_with(|| a.suffix.cmp(&b.suffix)));

        for start in starts {
            let mut current = start;
            while let Some(migration) = by_source.get(current) {
                current = migration.to_version();
            }
            if current != &latest {
                return Err(RegistryError::DeadEnd {
                    start: start.clone(),
                    stops_at: current.clone(),
                    latest,
                });
            }
        }

        Ok(Self { by_source, latest })
    }

    /// The built-in mGuard migration table.
    pub fn builtin() -> &'static MigrationRegistry {
        &super::builtin::BUILTIN_REGISTRY
    }

    /// Version every registered chain ends at
    pub fn latest(&self) -> &Version {
        &self.latest
    }

    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// Migration starting at exactly `from` (suffix included)
    pub fn get(&self, from: &Version) -> Option<&Migration> {
        self.by_source.get(from)
    }

    /// Look up the complete chain of migrations from `from` to `to`.
    ///
    /// Either the whole chain exists or this fails; an empty chain means the
    /// versions are equal.
    pub fn plan(&self, from: &Version, to: &Version) -> Result<Vec<&Migration>, MigrationError> {
        let mut chain = Vec::new();
        let mut current = from;

        while current != to {
            let no_path = || MigrationError::NoMigrationPath {
                from: current.clone(),
                to: to.clone(),
            };
            // Chains only move forward, so once we reach or pass the target's
            // release without hitting it exactly, there is no path.
            if current.release_cmp(to) != Ordering::Less {
                return Err(no_path());
            }
            let migration = self.by_source.get(current).ok_or_else(no_path)?;
            chain.push(migration);
            current = migration.to_version();
        }

        Ok(chain)
    }

    /// Migrate `file` to `target`, returning a new file.
    ///
    /// The caller's file is never modified. Every step works on a private copy,
    /// and a failure at any step discards all intermediate results. The final
    /// document is checked for duplicate row ids and dangling row references.
    pub fn resolve(&self, file: &File, target: &Version) -> Result<File, MigrationError> {
        let chain = self.plan(file.version(), target)?;

        let mut current = file.dupe();
        for migration in chain {
            tracing::debug!(step = %migration.step(), "applying migration");
            current = migration.apply(current)?;
        }

        current.document().validate()?;
        Ok(current)
    }

    /// Steps of the chain from `from` to `to`, for reporting
    pub fn steps(&self, from: &Version, to: &Version) -> Result<Vec<MigrationStep>, MigrationError> {
        Ok(self
            .plan(from, to)?
            .into_iter()
            .map(|migration| migration.step().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atv::ast::Document;
    use crate::atv::error::TransformError;
    use rstest::rstest;

    fn v(text: &str) -> Version {
        text.parse().unwrap()
    }

    fn ladder(versions: &[&str]) -> Vec<Migration> {
        versions
            .windows(2)
            .map(|pair| Migration::stamp_only(v(pair[0]), v(pair[1])))
            .collect()
    }

    fn registry(versions: &[&str]) -> MigrationRegistry {
        let latest = v(versions[versions.len() - 1]);
        MigrationRegistry::new(ladder(versions), latest).unwrap()
    }

    fn reject_all(_: Document) -> Result<Document, TransformError> {
        Err(TransformError::new("rejected"))
    }

    #[test]
    fn test_valid_ladder() {
        let reg = registry(&["8.0.2-default", "8.1.0-default", "8.2.0-default"]);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.latest(), &v("8.2.0-default"));
        assert!(reg.get(&v("8.0.2-default")).is_some());
        assert!(reg.get(&v("8.0.2-beta")).is_none());
    }

    #[test]
    fn test_empty_registry_is_valid() {
        let reg = MigrationRegistry::new(vec![], v("8.0.2-default")).unwrap();
        assert!(reg.is_empty());
        assert_eq!(
            reg.plan(&v("8.0.2-default"), &v("8.0.2-default")).unwrap().len(),
            0
        );
    }

    #[test]
    fn test_duplicate_source_is_rejected() {
        let mut migrations = ladder(&["8.0.2-default", "8.1.0-default"]);
        migrations.push(Migration::stamp_only(v("8.0.2-default"), v("8.2.0-default")));
        assert_eq!(
            MigrationRegistry::new(migrations, v("8.1.0-default")).unwrap_err(),
            RegistryError::DuplicateSource(v("8.0.2-default"))
        );
    }

    #[rstest]
    #[case::backwards("8.1.0-default", "8.0.2-default")]
    #[case::same_release("8.1.0-default", "8.1.0-beta")]
    fn test_non_advancing_is_rejected(#[case] from: &str, #[case] to: &str) {
        let migrations = vec![Migration::stamp_only(v(from), v(to))];
        assert_eq!(
            MigrationRegistry::new(migrations, v(to)).unwrap_err(),
            RegistryError::NotAdvancing {
                from: v(from),
                to: v(to),
            }
        );
    }

    #[test]
    fn test_dead_end_is_rejected() {
        let mut migrations = ladder(&["8.0.2-default", "8.1.0-default", "8.2.0-default"]);
        migrations.push(Migration::stamp_only(v("8.0.2-beta"), v("8.1.0-beta")));
        assert_eq!(
            MigrationRegistry::new(migrations, v("8.2.0-default")).unwrap_err(),
            RegistryError::DeadEnd {
                start: v("8.0.2-beta"),
                stops_at: v("8.1.0-beta"),
                latest: v("8.2.0-default"),
            }
        );
    }

    #[test]
    fn test_plan_walks_the_chain() {
        let reg = registry(&["8.0.2-default", "8.1.0-default", "8.2.0-default"]);
        let steps = reg.steps(&v("8.0.2-default"), &v("8.2.0-default")).unwrap();
        let rendered: Vec<String> = steps.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "8.0.2-default -> 8.1.0-default",
                "8.1.0-default -> 8.2.0-default"
            ]
        );
    }

    #[rstest]
    #[case::downgrade("8.1.0-default", "8.0.2-default", "8.1.0-default")]
    #[case::unknown_suffix("8.0.2-beta", "8.2.0-default", "8.0.2-beta")]
    #[case::suffix_change("8.1.0-default", "8.1.0-beta", "8.1.0-default")]
    #[case::skipped_target("8.0.2-default", "8.1.5-default", "8.2.0-default")]
    #[case::past_latest("8.0.2-default", "9.0.0-default", "8.2.0-default")]
    fn test_plan_without_path(#[case] from: &str, #[case] to: &str, #[case] stuck_at: &str) {
        let reg = registry(&["8.0.2-default", "8.1.0-default", "8.2.0-default"]);
        assert_eq!(
            reg.plan(&v(from), &v(to)).unwrap_err(),
            MigrationError::NoMigrationPath {
                from: v(stuck_at),
                to: v(to),
            }
        );
    }

    #[test]
    fn test_resolve_aborts_on_failing_step_without_touching_input() {
        let migrations = vec![
            Migration::stamp_only(v("8.0.2-default"), v("8.1.0-default")),
            Migration::new(v("8.1.0-default"), v("8.2.0-default"), reject_all),
        ];
        let reg = MigrationRegistry::new(migrations, v("8.2.0-default")).unwrap();
        let file: File = "#version \"8.0.2-default\"\n".parse().unwrap();
        let before = file.clone();

        let err = reg.resolve(&file, &v("8.2.0-default")).unwrap_err();

        assert!(matches!(
            err,
            MigrationError::MigrationFailed { ref step, .. } if step.from == v("8.1.0-default")
        ));
        assert_eq!(file, before);
    }

    #[test]
    fn test_resolve_identity_returns_equal_file() {
        let reg = registry(&["8.0.2-default", "8.1.0-default"]);
        let file: File = "#version \"8.1.0-default\"\nA = \"1\"\n".parse().unwrap();
        assert_eq!(reg.resolve(&file, &v("8.1.0-default")).unwrap(), file);
    }

    #[test]
    fn test_resolve_rejects_dangling_reference() {
        let reg = registry(&["8.0.2-default", "8.1.0-default"]);
        let file: File = "#version \"8.0.2-default\"\nREF = { rowref = \"r9\" }\n"
            .parse()
            .unwrap();
        assert_eq!(
            reg.resolve(&file, &v("8.1.0-default")).unwrap_err(),
            MigrationError::Structure(crate::atv::error::StructureError::DanglingRowReference(
                crate::atv::ast::RowRef::new("r9")
            ))
        );
    }
}
