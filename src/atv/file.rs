//! A parsed configuration file with a known schema version
//!
//! [`File`] is the unit every pipeline stage works on: it wraps a [`Document`]
//! whose `version` pragma has been parsed into a [`Version`], and keeps the two
//! in sync. Every operation that produces a new file returns a fresh value and
//! leaves its inputs untouched.

use serde::Serialize;
use std::io;
use std::str::FromStr;

use crate::atv::ast::{Document, Pragma};
use crate::atv::error::{MergeError, MigrationError, ParseError, SerializeError, VersionError};
use crate::atv::formats::serializer::AtvSerializer;
use crate::atv::formats::Dialect;
use crate::atv::merge;
use crate::atv::migration::MigrationRegistry;
use crate::atv::parser;
use crate::atv::version::Version;

/// Name of the pragma that carries the schema version
pub const VERSION_PRAGMA: &str = "version";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    version: Version,
    document: Document,
}

impl File {
    /// Parse ATV text into a file.
    ///
    /// Fails on any syntax error, and when the document has zero or several
    /// `version` pragmas or an unparsable version.
    pub fn parse(source: &str) -> Result<File, ParseError> {
        let document = parser::parse_document(source)?;
        File::from_document(document)
    }

    /// Wrap a document, reading its version from the `version` pragma.
    pub fn from_document(document: Document) -> Result<File, ParseError> {
        let version = {
            let mut versions = document
                .pragmas()
                .filter(|pragma| pragma.name == VERSION_PRAGMA);

            let pragma = versions.next().ok_or(ParseError::MissingVersion)?;
            if versions.next().is_some() {
                return Err(ParseError::DuplicateVersion);
            }
            pragma.value.parse()?
        };
        Ok(File { version, document })
    }

    /// Wrap a document and stamp it with `version`.
    pub(crate) fn stamped(document: Document, version: &Version) -> File {
        let mut file = File {
            version: version.clone(),
            document,
        };
        file.set_version(version);
        file
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Deep copy sharing no nodes with `self`
    pub fn dupe(&self) -> File {
        File {
            version: self.version.clone(),
            document: self.document.dupe(),
        }
    }

    /// Set a pragma, keeping the cached version in sync.
    ///
    /// Setting `version` to text that does not parse as a version is rejected
    /// and leaves the file unchanged.
    pub fn set_pragma(&mut self, name: &str, value: &str) -> Result<&Pragma, VersionError> {
        if name == VERSION_PRAGMA {
            self.version = value.parse()?;
        }
        Ok(self.document.set_pragma(name, value))
    }

    /// Stamp the document with `version`.
    pub fn set_version(&mut self, version: &Version) -> &Pragma {
        self.version = version.clone();
        self.document.set_pragma(VERSION_PRAGMA, version.to_string())
    }

    /// Migrate to `target` using the built-in migration table.
    pub fn migrate_to(&self, target: &Version) -> Result<File, MigrationError> {
        self.migrate_with(MigrationRegistry::builtin(), target)
    }

    /// Migrate to `target` using the given migration table.
    pub fn migrate_with(
        &self,
        registry: &MigrationRegistry,
        target: &Version,
    ) -> Result<File, MigrationError> {
        registry.resolve(self, target)
    }

    /// Merge `overrides` on top of this file. See [`merge::merge`].
    pub fn merge(&self, overrides: Option<&File>) -> Result<File, MergeError> {
        merge::merge(self, overrides)
    }

    /// Render the file as text in the given dialect.
    pub fn serialize(&self, dialect: Dialect) -> Result<String, SerializeError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer, dialect)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Write the file to `sink` in the given dialect.
    pub fn write_to<W: io::Write>(&self, sink: W, dialect: Dialect) -> Result<(), SerializeError> {
        let mut serializer = AtvSerializer::new(sink, dialect);
        serializer.serialize(&self.document)?;
        Ok(())
    }
}

impl FromStr for File {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        File::parse(s)
    }
}
