//! Schema migrations between document versions
//!
//! A [`Migration`] advances a document by exactly one version. Migrations are
//! collected in a [`MigrationRegistry`], which is validated once when it is
//! built and is read-only afterwards, so a single registry can serve any number
//! of threads.

pub mod builtin;
pub mod registry;

use serde::Serialize;
use std::fmt;

use crate::atv::ast::Document;
use crate::atv::error::{MigrationError, TransformError};
use crate::atv::file::File;
use crate::atv::version::Version;

pub use registry::MigrationRegistry;

/// Content transform of a single migration step.
///
/// It receives a private copy of the document and must not stamp the version;
/// the resolver does that after the transform succeeds.
pub type Transform = fn(Document) -> Result<Document, TransformError>;

/// The `from -> to` edge of a migration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MigrationStep {
    pub from: Version,
    pub to: Version,
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A single registered migration
#[derive(Debug, Clone)]
pub struct Migration {
    step: MigrationStep,
    transform: Transform,
}

impl Migration {
    pub fn new(from: Version, to: Version, transform: Transform) -> Self {
        Self {
            step: MigrationStep { from, to },
            transform,
        }
    }

    /// A migration that changes nothing but the version stamp.
    pub fn stamp_only(from: Version, to: Version) -> Self {
        Self::new(from, to, Ok)
    }

    pub fn from_version(&self) -> &Version {
        &self.step.from
    }

    pub fn to_version(&self) -> &Version {
        &self.step.to
    }

    pub fn step(&self) -> &MigrationStep {
        &self.step
    }

    /// Apply this migration to `file`, which must be at [`Self::from_version`].
    pub fn apply(&self, file: File) -> Result<File, MigrationError> {
        debug_assert_eq!(file.version(), &self.step.from);

        let document = (self.transform)(file.into_document()).map_err(|cause| {
            MigrationError::MigrationFailed {
                step: self.step.clone(),
                cause,
            }
        })?;

        Ok(File::stamped(document, &self.step.to))
    }
}
