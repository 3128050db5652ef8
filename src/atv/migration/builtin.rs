//! Built-in migration table for mGuard configuration profiles
//!
//! Every known release advances the document by stamping the new version.
//! None of them rewrites content yet.

use once_cell::sync::Lazy;

use super::{Migration, MigrationRegistry};
use crate::atv::version::Version;

/// Releases in upgrade order. Each entry migrates to the one that follows it.
const LADDER: &[(u32, u32, u32)] = &[
    (8, 0, 2),
    (8, 1, 0),
    (8, 1, 1),
    (8, 1, 2),
    (8, 3, 0),
    (8, 4, 0),
    (8, 5, 0),
    (8, 6, 0),
    (8, 6, 1),
    (8, 7, 0),
    (8, 7, 1),
];

const FLAVOR: &str = "default";

pub(crate) static BUILTIN_REGISTRY: Lazy<MigrationRegistry> = Lazy::new(|| {
    let (migrations, latest) = builtin_migrations();
    MigrationRegistry::new(migrations, latest).expect("built-in migration table is consistent")
});

fn release((major, minor, patch): (u32, u32, u32)) -> Version {
    Version::new(major, minor, patch, FLAVOR)
}

/// The built-in migrations and the version they all lead to.
pub fn builtin_migrations() -> (Vec<Migration>, Version) {
    let migrations = LADDER
        .windows(2)
        .map(|pair| Migration::stamp_only(release(pair[0]), release(pair[1])))
        .collect();
    let latest = release(LADDER[LADDER.len() - 1]);
    (migrations, latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_consistent() {
        let (migrations, latest) = builtin_migrations();
        assert_eq!(migrations.len(), LADDER.len() - 1);
        assert!(MigrationRegistry::new(migrations, latest).is_ok());
    }

    #[test]
    fn test_builtin_latest() {
        let registry = MigrationRegistry::builtin();
        assert_eq!(registry.latest(), &Version::new(8, 7, 1, "default"));
    }

    #[test]
    fn test_full_ladder_is_reachable() {
        let registry = MigrationRegistry::builtin();
        let steps = registry
            .steps(&Version::new(8, 0, 2, "default"), registry.latest())
            .unwrap();
        assert_eq!(steps.len(), 10);
        assert_eq!(steps[0].to, Version::new(8, 1, 0, "default"));
        assert_eq!(steps[3].to, Version::new(8, 3, 0, "default"));
    }
}
