//! Ordered response-header directive sets.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// An ordered mapping from header name to header value, built once per
/// configuration and replayed per response.
///
/// Insertion order is preserved; inserting a name that is already present
/// replaces the value in place. The set is immutable once composition is
/// done.
#[derive(Debug, Clone, Default)]
pub struct HeaderDirectiveSet {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderDirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directive, replacing any existing directive for the same
    /// header name while keeping its original position.
    pub fn insert(&mut self, name: HeaderName, value: HeaderValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Insert a directive from a string value, skipping it with a warning
    /// when the value cannot be encoded as a header.
    pub fn insert_str(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(v) => self.insert(name, v),
            Err(_) => {
                tracing::warn!(header = %name, value, "Skipping unencodable header directive");
            }
        }
    }

    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &HeaderName) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(HeaderName, HeaderValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replay every directive onto a response header map.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.entries {
            headers.insert(name.clone(), value.clone());
        }
    }
}
