//! Output formats for ATV documents
//!
//! A document is rendered by [`serializer::AtvSerializer`] in one of two
//! dialects. They share layout and differ only in how string literals are
//! quoted (see [`escape`]).

pub mod escape;
pub mod serializer;

use std::fmt;
use std::str::FromStr;

pub use escape::{quote, unquote};
pub use serializer::AtvSerializer;

/// Output dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Plain ATV, non-ASCII text emitted verbatim
    #[default]
    Atv,
    /// ECS container flavor, pure ASCII output
    Ecs,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Atv, Dialect::Ecs];

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Atv => "atv",
            Dialect::Ecs => "ecs",
        }
    }

    /// Conventional file extension for this dialect
    pub fn extension(&self) -> &'static str {
        self.name()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "atv" => Ok(Dialect::Atv),
            "ecs" => Ok(Dialect::Ecs),
            _ => Err(format!("unknown dialect '{s}', expected 'atv' or 'ecs'")),
        }
    }
}
