//! Per-request coordination flags.

use std::collections::HashMap;

/// Flags the pipeline stages use to coordinate within one request.
///
/// The boolean flags are monotonic: once set they cannot be cleared. A
/// fresh store is created for every request and discarded with it; nothing
/// here survives across requests.
#[derive(Debug, Clone, Default)]
pub struct FlagStore {
    disabled: bool,
    enabled: bool,
    merged: bool,
    extra: HashMap<String, String>,
}

impl FlagStore {
    /// Create an empty flag store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permanently bypass the composition pipeline for this request.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    /// Whether the pipeline is bypassed.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Record that parsing succeeded and downstream stages may act.
    pub fn mark_enabled(&mut self) {
        self.enabled = true;
    }

    /// Whether parsing succeeded for this request.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record that the site layout has been merged in.
    pub fn mark_merged(&mut self) {
        self.merged = true;
    }

    /// Whether the layout merge has happened.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged
    }

    /// Set a free-form string flag.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Look up a free-form string flag.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}
