//! # atv
//!
//! Parser, migrator, merger and serializer for mGuard ATV configuration documents.
//!
//! The typical pipeline reads a base configuration, brings it to the target
//! schema version, overlays a site specific override and writes the result:
//!
//! ```text
//! let base = atv::parse(&base_text)?;
//! let target: atv::Version = "8.7.1-default".parse()?;
//! let merged = base.migrate_to(&target)?.merge(Some(&overrides.migrate_to(&target)?))?;
//! let text = merged.serialize(atv::Dialect::Ecs)?;
//! ```
//!
//! Every step returns a new [`File`]; inputs are never modified.
//!
//! ## Testing
//!
//! For testing guidelines, see the [testing module](atv::testing).
//! Parser tests use the verified documents in `samples/` and the fluent
//! document assertions.

pub mod atv;

pub use atv::ast::Document;
pub use atv::error::{
    MergeError, MigrationError, ParseError, RegistryError, SerializeError, StructureError,
    TransformError, VersionError,
};
pub use atv::file::File;
pub use atv::formats::Dialect;
pub use atv::migration::{Migration, MigrationRegistry};
pub use atv::version::Version;

/// Parse ATV text into a [`File`]. Shorthand for [`File::parse`].
pub fn parse(source: &str) -> Result<File, ParseError> {
    File::parse(source)
}
