//! Request-scoped context passed to every transform stage.

use crate::flags::FlagStore;

/// Everything a stage may consult or update for the current request:
/// inbound request headers, outbound response headers, and the
/// [`FlagStore`] the stages coordinate through.
///
/// Header names keep the casing they were set with so an emitter can put
/// them on the wire verbatim; lookup is case-insensitive. The context is
/// created at chain entry and discarded at chain exit; it is never shared
/// across requests.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_headers: Vec<(String, String)>,
    response_headers: Vec<(String, String)>,
    flags: FlagStore,
}

impl RequestContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an inbound request header.
    #[must_use]
    pub fn with_request_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        set_header(&mut self.request_headers, name.into(), value.into());
        self
    }

    /// Add an outbound response header.
    #[must_use]
    pub fn with_response_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        set_header(&mut self.response_headers, name.into(), value.into());
        self
    }

    /// Look up an inbound request header.
    #[must_use]
    pub fn request_header(&self, name: &str) -> Option<&str> {
        get_header(&self.request_headers, name)
    }

    /// Look up an outbound response header.
    #[must_use]
    pub fn response_header(&self, name: &str) -> Option<&str> {
        get_header(&self.response_headers, name)
    }

    /// Set an outbound response header, replacing any existing value.
    pub fn set_response_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        set_header(&mut self.response_headers, name.into(), value.into());
    }

    /// Iterate the outbound response headers in insertion order, with the
    /// casing they were set with.
    pub fn response_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.response_headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The per-request flag store.
    #[must_use]
    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    /// Mutable access to the per-request flag store.
    pub fn flags_mut(&mut self) -> &mut FlagStore {
        &mut self.flags
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    if let Some(entry) = headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
    {
        *entry = (name, value);
    } else {
        headers.push((name, value));
    }
}

fn get_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let ctx = RequestContext::new()
            .with_response_header("Content-Type", "text/html")
            .with_request_header("X-ESI-Enabled", "true");

        assert_eq!(ctx.response_header("content-type"), Some("text/html"));
        assert_eq!(ctx.response_header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(ctx.request_header("x-esi-enabled"), Some("true"));
        assert_eq!(ctx.request_header("Content-Type"), None);
    }

    #[test]
    fn set_response_header_replaces_across_casings() {
        let mut ctx = RequestContext::new().with_response_header("X-Esi", "0");
        ctx.set_response_header("x-esi", "1");
        assert_eq!(ctx.response_header("X-Esi"), Some("1"));
        assert_eq!(ctx.response_headers().count(), 1);
    }

    #[test]
    fn headers_keep_their_casing_for_emission() {
        let mut ctx = RequestContext::new().with_response_header("Content-Type", "text/html");
        ctx.set_response_header("X-Esi", "1");

        let emitted: Vec<(&str, &str)> = ctx.response_headers().collect();
        assert_eq!(emitted, vec![("Content-Type", "text/html"), ("X-Esi", "1")]);
    }

    #[test]
    fn flags_are_reachable() {
        let mut ctx = RequestContext::new();
        ctx.flags_mut().disable();
        assert!(ctx.flags().is_disabled());
    }
}
