//! Ordered token extraction.

use crate::config::CsrfConfig;
use crate::request::CsrfRequest;

/// One place a token may be supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Field of the decoded body
    BodyField(String),
    /// Field of the decoded query string
    QueryField(String),
    /// Request header
    Header(String),
}

impl TokenSource {
    /// Read this source from `request`; empty values count as absent
    pub fn read<R: CsrfRequest + ?Sized>(&self, request: &R) -> Option<String> {
        let value = match self {
            TokenSource::BodyField(name) => request.body_field(name),
            TokenSource::QueryField(name) => request.query_field(name),
            TokenSource::Header(name) => request.header(name),
        }?;

        (!value.is_empty()).then_some(value)
    }
}

/// Sources evaluated in order; the first present value wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExtractor {
    sources: Vec<TokenSource>,
}

impl TokenExtractor {
    pub fn new(sources: Vec<TokenSource>) -> Self {
        Self { sources }
    }

    /// Body field, then query field, then each configured header
    pub fn from_config(config: &CsrfConfig) -> Self {
        let mut sources = vec![
            TokenSource::BodyField(config.field_name.clone()),
            TokenSource::QueryField(config.field_name.clone()),
        ];
        sources.extend(config.header_names.iter().cloned().map(TokenSource::Header));
        Self::new(sources)
    }

    pub fn sources(&self) -> &[TokenSource] {
        &self.sources
    }

    /// Candidate token and the source it came from
    pub fn extract<R: CsrfRequest + ?Sized>(&self, request: &R) -> Option<(&TokenSource, String)> {
        self.sources
            .iter()
            .find_map(|source| source.read(request).map(|value| (source, value)))
    }
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self::from_config(&CsrfConfig::default())
    }
}
