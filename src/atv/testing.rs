//! Testing utilities for ATV documents
//!
//! # Parser Testing Guidelines
//!
//! Two tools are meant to be used together:
//!
//! 1. **[AtvSamples]** - verified ATV documents from the `samples/` directory
//! 2. **[assert_document](fn@assert_document)** - fluent assertions on the parsed tree
//!
//! ## Rule 1: Prefer verified samples for whole documents
//!
//! Hand-written documents in tests drift from what real devices export. The
//! samples are checked to be in canonical form (serializing the parsed sample
//! reproduces it byte for byte), so they double as serializer fixtures.
//!
//! ```rust-example
//! use crate::atv::testing::AtvSamples;
//!
//! let file = AtvSamples::file("firewall.atv");
//! ```
//!
//! Small inline snippets are still fine for edge cases a sample cannot show.
//!
//! ## Rule 2: Assert shape and content, not counts
//!
//! ```rust-example
//! use crate::atv::testing::assert_document;
//!
//! assert_document(file.document())
//!     .pragma("version", "8.0.2-default")
//!     .setting("FW_INCOMING", |value| {
//!         value.assert_table().row_count(2).row(0, |row| {
//!             row.id("r1").simple("TARGET", "accept");
//!         });
//!     });
//! ```

mod testing_assertions;
mod testing_samples;

pub use testing_assertions::{
    assert_document, BlockAssertion, DocumentAssertion, RowAssertion, TableAssertion,
    ValueAssertion,
};
pub use testing_samples::AtvSamples;
