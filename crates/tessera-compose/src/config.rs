//! Pipeline configuration.

use serde::Deserialize;

/// Configuration for the composition pipeline.
///
/// Loaded from TOML or built in code; the knob feeds the parse stage,
/// which decides how parsed documents are rendered back out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Pretty-print serialized output instead of compact markup.
    pub pretty_print: bool,
}

impl ComposeConfig {
    /// Parse configuration from TOML text.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error for malformed TOML or wrongly typed
    /// values.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}
