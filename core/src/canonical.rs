//! Canonical request construction.
//!
//! Everything here is a pure function of a [`RequestState`] snapshot.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use http::Method;

use crate::collator::BinaryCollator;
use crate::encoding::{encode_path, encode_query_component};
use crate::hash::EMPTY_STRING_SHA256;
use crate::{Error, Result};

/// Accumulated state of one request before signing.
///
/// Header names are stored lower-cased, so adding `Host` and `host` targets
/// the same header. Adding a header twice appends a value.
#[derive(Debug, Clone)]
pub struct RequestState {
    pub(crate) service_name: String,
    pub(crate) method: Method,
    pub(crate) host: Option<String>,
    pub(crate) path: String,
    pub(crate) body_hash: String,
    pub(crate) headers: HashMap<String, Vec<String>>,
    pub(crate) signed_headers: HashSet<String>,
    pub(crate) query: Vec<(String, String)>,
}

impl RequestState {
    /// Create an empty `GET /` state for the given service.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            method: Method::GET,
            host: None,
            path: "/".to_string(),
            body_hash: EMPTY_STRING_SHA256.to_string(),
            headers: HashMap::new(),
            signed_headers: HashSet::new(),
            query: Vec::new(),
        }
    }

    /// Append a header value, optionally marking the header as signed.
    pub fn add_header(&mut self, name: &str, value: impl Into<String>, signed: bool) {
        let name = name.to_ascii_lowercase();
        self.headers
            .entry(name.clone())
            .or_default()
            .push(value.into());
        if signed {
            self.signed_headers.insert(name);
        }
    }

    /// Replace all values of a header.
    pub(crate) fn set_header(&mut self, name: &str, value: impl Into<String>, signed: bool) {
        let name = name.to_ascii_lowercase();
        self.headers.insert(name.clone(), vec![value.into()]);
        if signed {
            self.signed_headers.insert(name);
        }
    }

    /// Remove a header from both the header map and the signed set.
    pub(crate) fn remove_header(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        self.headers.remove(&name);
        self.signed_headers.remove(&name);
    }

    /// Values of a header.
    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_slice())
    }

    /// Whether a header has at least one value.
    pub fn contains_header(&self, name: &str) -> bool {
        self.header(name).is_some_and(|v| !v.is_empty())
    }

    /// Whether a header is part of the signature.
    pub fn is_signed(&self, name: &str) -> bool {
        self.signed_headers.contains(&name.to_ascii_lowercase())
    }

    /// Http method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Host override, if any.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Url path as given.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Hex SHA-256 of the body.
    pub fn body_hash(&self) -> &str {
        &self.body_hash
    }

    /// Append a query parameter.
    pub fn add_query_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Signed header names in canonical order.
    pub fn sorted_signed_headers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.signed_headers.iter().map(|v| v.as_str()).collect();
        BinaryCollator::UTF8.sort(&mut names);
        names
    }

    /// The full canonical request.
    ///
    /// ```text
    /// method
    /// canonical path
    /// canonical query string
    /// canonical headers (each line ends with \n)
    /// signed headers
    /// body hash
    /// ```
    pub fn canonical_request(&self) -> Result<String> {
        let mut s = String::new();
        writeln!(s, "{}", self.method)?;
        writeln!(s, "{}", canonical_path(&self.path))?;
        writeln!(s, "{}", canonical_query_string(&self.query))?;
        writeln!(s, "{}", self.canonical_headers()?)?;
        writeln!(s, "{}", self.canonical_signed_headers())?;
        write!(s, "{}", self.body_hash)?;
        Ok(s)
    }

    /// Canonical headers block, one `name:value\n` line per signed header.
    ///
    /// A signed header without values is an internal inconsistency and
    /// returns an error instead of being skipped.
    pub fn canonical_headers(&self) -> Result<String> {
        let mut s = String::new();
        for name in self.sorted_signed_headers() {
            let values = self
                .headers
                .get(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    Error::unexpected(format!(
                        "signed header {name} has no value, canonical request is inconsistent"
                    ))
                })?;

            s.push_str(name);
            s.push(':');
            match values.as_slice() {
                [value] => s.push_str(&canonical_header_value(value)),
                values => {
                    let joined = values
                        .iter()
                        .map(|v| trim_ascii_whitespace(v))
                        .collect::<Vec<_>>()
                        .join(",");
                    s.push_str(&joined);
                }
            }
            s.push('\n');
        }
        Ok(s)
    }

    /// Signed header names joined with `;`.
    pub fn canonical_signed_headers(&self) -> String {
        self.sorted_signed_headers().join(";")
    }
}

/// Trim a single header value.
///
/// A quoted value that contains a space gets every run of whitespace inside
/// the quotes squashed into a single space. Only ASCII whitespace counts.
pub fn canonical_header_value(value: &str) -> String {
    let value = trim_ascii_whitespace(value);
    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    if !quoted || !value[1..].contains(' ') {
        return value.to_string();
    }

    let inner = &value[1..value.len() - 1];
    let mut squashed = inner
        .split(|c: char| c.is_ascii_whitespace())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if inner.starts_with(|c: char| c.is_ascii_whitespace()) {
        squashed.insert(0, ' ');
    }
    format!("\"{squashed}\"")
}

fn trim_ascii_whitespace(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Normalize and encode a path for signing.
///
/// `.` segments and duplicate slashes are dropped, `..` removes the previous
/// segment. The result always starts with `/`, and keeps a trailing `/` when
/// the input had one and the result is longer than `/`. Segments are then
/// percent encoded with `/` kept.
pub fn canonical_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // Nothing is above the root of an absolute path.
                _ if absolute => {}
                _ => segments.push(".."),
            },
            v => segments.push(v),
        }
    }

    let mut normalized = format!("/{}", segments.join("/"));
    if normalized.len() > 1 && path.ends_with('/') {
        normalized.push('/');
    }
    encode_path(&normalized)
}

/// Build the canonical query string.
///
/// Keys and values are encoded, keys are sorted and each key's distinct
/// values are sorted, all with the ASCII byte order. Repeated values repeat
/// the key: `k=v1&k=v2`.
pub fn canonical_query_string(query: &[(String, String)]) -> String {
    if query.is_empty() {
        return String::new();
    }

    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (k, v) in query {
        grouped
            .entry(encode_query_component(k))
            .or_default()
            .push(encode_query_component(v));
    }

    let mut keys: Vec<&String> = grouped.keys().collect();
    BinaryCollator::ASCII.sort(&mut keys);

    let mut pairs = Vec::with_capacity(query.len());
    for key in keys {
        let mut values: Vec<&String> = grouped[key].iter().collect();
        BinaryCollator::ASCII.sort(&mut values);
        values.dedup();
        for value in values {
            pairs.push(format!("{key}={value}"));
        }
    }
    pairs.join("&")
}
