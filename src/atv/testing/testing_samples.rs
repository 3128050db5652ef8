//! Verified sample documents

use crate::atv::file::File;

const SAMPLES: &[(&str, &str)] = &[
    ("minimal.atv", include_str!("../../../samples/minimal.atv")),
    ("firewall.atv", include_str!("../../../samples/firewall.atv")),
    ("override.atv", include_str!("../../../samples/override.atv")),
];

/// Access to the documents in `samples/`
pub struct AtvSamples;

impl AtvSamples {
    /// Names of all samples
    pub fn names() -> impl Iterator<Item = &'static str> {
        SAMPLES.iter().map(|(name, _)| *name)
    }

    /// Source text of a sample. Panics on an unknown name.
    pub fn get_string(name: &str) -> &'static str {
        SAMPLES
            .iter()
            .find(|(sample, _)| *sample == name)
            .map(|(_, source)| *source)
            .unwrap_or_else(|| panic!("unknown sample '{name}'"))
    }

    /// Parsed sample. Panics if the sample does not parse.
    pub fn file(name: &str) -> File {
        File::parse(Self::get_string(name))
            .unwrap_or_else(|err| panic!("sample '{name}' does not parse: {err}"))
    }
}
