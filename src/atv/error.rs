//! Error types for every stage of the ATV pipeline
//!
//! Each operation returns its own error enum. None of them are retried or
//! logged by the library; they are surfaced to the caller as-is.

use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

use crate::atv::ast::{Position, RowId, RowRef};
use crate::atv::migration::MigrationStep;
use crate::atv::version::Version;

/// Malformed ATV input. The parser does not recover: the first error wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input that does not form any token (unknown character, bad string literal)
    #[error("{position}: invalid token {text:?}")]
    InvalidToken { position: Position, text: String },

    /// A token the grammar does not allow at this point
    #[error("{position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: Position,
        expected: String,
        found: String,
    },

    #[error("document has no 'version' pragma")]
    MissingVersion,

    #[error("document declares the 'version' pragma more than once")]
    DuplicateVersion,

    #[error("invalid 'version' pragma: {0}")]
    InvalidVersion(#[from] VersionError),
}

impl ParseError {
    /// Source position of a syntax error, if the error has one
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::InvalidToken { position, .. }
            | ParseError::UnexpectedToken { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Text that is not a `major.minor.patch-suffix` version
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("'{0}' is not of the form major.minor.patch-suffix")]
    Malformed(String),

    #[error("version component '{component}' in '{text}' is out of range")]
    OutOfRange { text: String, component: String },
}

/// Violation of the row id / row reference invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("row id '{0}' is used more than once")]
    DuplicateRowId(RowId),

    #[error("row reference '{0}' does not resolve to any row id")]
    DanglingRowReference(RowRef),
}

/// Failure reported by a single migration transform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransformError {
    message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    #[error("no migration path from version {from} to version {to}")]
    NoMigrationPath { from: Version, to: Version },

    #[error("migration {step} failed: {cause}")]
    MigrationFailed {
        step: MigrationStep,
        #[source]
        cause: TransformError,
    },

    #[error("migrated document is inconsistent: {0}")]
    Structure(#[from] StructureError),
}

/// Inconsistent migration table, detected when the registry is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("more than one migration starts at version {0}")]
    DuplicateSource(Version),

    #[error("migration {from} -> {to} does not advance the release number")]
    NotAdvancing { from: Version, to: Version },

    #[error("migration chain from version {start} stops at {stops_at} instead of {latest}")]
    DeadEnd {
        start: Version,
        stops_at: Version,
        latest: Version,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("cannot merge version {override_version} into version {base_version}")]
    IncompatibleVersions {
        base_version: Version,
        override_version: Version,
    },

    #[error("merged document is inconsistent: {0}")]
    Structure(#[from] StructureError),
}

/// Failure of the sink a document is written to
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("writing document failed: {0}")]
    Io(#[from] io::Error),

    #[error("rendered document is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}
