//! Response decoding and service error payloads.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use dashmap::DashMap;
use encoding::label::encoding_from_whatwg_label;
use encoding::{DecoderTrap, EncodingRef};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use log::debug;
use once_cell::sync::Lazy;

use crate::{Error, Result};

/// Charsets resolved per lower-cased charset label, shared by the whole
/// process. Only labels that resolve are kept.
static CHARSETS: Lazy<DashMap<String, EncodingRef>> = Lazy::new(DashMap::new);

/// A received response with its body decoded into text.
#[derive(Debug, Clone)]
pub struct Response {
    url: String,
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Response {
    /// Decode an http response that was received for `url`.
    pub fn new(url: impl Into<String>, resp: http::Response<Bytes>) -> Result<Self> {
        let url = url.into();
        let (parts, body) = resp.into_parts();
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let charset = charset(content_type);
        let body = charset
            .decode(&body, DecoderTrap::Strict)
            .map_err(|err| {
                Error::response_invalid(format!(
                    "response body of {url} is not valid {}: {err}",
                    charset.name()
                ))
            })?;

        Ok(Self {
            url,
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// The url the request was sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A response header as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the status is one the commands treat as success.
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED | StatusCode::NO_CONTENT
        )
    }
}

/// Resolve the charset of a `Content-Type` value, UTF-8 when it has none.
pub fn charset(content_type: &str) -> EncodingRef {
    let Some(label) = charset_label(content_type) else {
        return encoding::all::UTF_8 as EncodingRef;
    };
    let label = label.to_ascii_lowercase();
    if let Some(enc) = CHARSETS.get(&label) {
        return *enc;
    }

    match encoding_from_whatwg_label(&label) {
        Some(enc) => *CHARSETS.entry(label).or_insert(enc),
        None => {
            debug!("unknown charset {label} in content type {content_type}, using utf-8");
            encoding::all::UTF_8 as EncodingRef
        }
    }
}

/// The `charset` parameter of a `Content-Type` value, quotes removed.
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"').trim();
        (!value.is_empty()).then_some(value)
    })
}

/// Error payload returned by a service for a non-success status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// Http status of the response.
    pub status: StatusCode,
    /// Machine readable error code, such as `NoSuchBucket`.
    pub code: Option<String>,
    /// Human readable message.
    pub message: Option<String>,
    /// The resource the error is about.
    pub resource: Option<String>,
    /// Request id assigned by the service.
    pub request_id: Option<String>,
    /// Any other fields the service sent.
    pub details: BTreeMap<String, String>,
}

impl ServiceError {
    /// An error that carries only a status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            code: None,
            message: None,
            resource: None,
            request_id: None,
            details: BTreeMap::new(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service responded {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, ", code: {code}")?;
        }
        if let Some(message) = &self.message {
            write!(f, ", message: {message}")?;
        }
        if let Some(resource) = &self.resource {
            write!(f, ", resource: {resource}")?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, ", request id: {request_id}")?;
        }
        Ok(())
    }
}

/// Turns a failed response into a [`ServiceError`].
pub trait ParseErrorResponse: fmt::Debug + Send + Sync + 'static {
    /// Parse the error payload of a non-success response.
    ///
    /// Returns `ResponseInvalid` when the body cannot be understood.
    fn parse_error_response(&self, resp: &Response) -> Result<ServiceError>;
}

/// Error parser that only keeps the status.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusOnlyErrorParser;

impl ParseErrorResponse for StatusOnlyErrorParser {
    fn parse_error_response(&self, resp: &Response) -> Result<ServiceError> {
        Ok(ServiceError::new(resp.status()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn response(content_type: Option<&str>, body: &[u8]) -> http::Response<Bytes> {
        let mut builder = http::Response::builder().status(StatusCode::OK);
        if let Some(v) = content_type {
            builder = builder.header(CONTENT_TYPE, v);
        }
        builder.body(Bytes::copy_from_slice(body)).unwrap()
    }

    #[test_case("application/xml", None ; "no charset")]
    #[test_case("text/plain; charset=ISO-8859-1", Some("ISO-8859-1") ; "bare")]
    #[test_case("text/plain;charset=\"utf-8\"", Some("utf-8") ; "quoted")]
    #[test_case("text/plain; format=flowed; Charset=latin1", Some("latin1") ; "not first")]
    #[test_case("text/plain; charset=", None ; "empty")]
    fn test_charset_label(content_type: &str, expected: Option<&str>) {
        assert_eq!(charset_label(content_type), expected);
    }

    #[test]
    fn test_charset_cache() {
        let enc = charset("text/plain; charset=windows-1252");
        assert_eq!(enc.name(), "windows-1252");
        assert!(CHARSETS.contains_key("windows-1252"));
        assert_eq!(
            charset("application/xml; charset=\"Windows-1252\"").name(),
            "windows-1252"
        );
        assert!(!CHARSETS.contains_key("Windows-1252"));

        assert_eq!(charset("text/plain; charset=no-such-charset").name(), "utf-8");
        assert!(!CHARSETS.contains_key("no-such-charset"));
        assert_eq!(charset("").name(), "utf-8");
        assert!(!CHARSETS.contains_key(""));
    }

    #[test]
    fn test_decode_latin1_body() {
        let resp = Response::new(
            "https://s3.amazonaws.com/",
            response(Some("text/plain; charset=ISO-8859-1"), b"caf\xe9"),
        )
        .unwrap();
        assert_eq!(resp.body(), "café");
        assert!(resp.is_success());
        assert_eq!(resp.url(), "https://s3.amazonaws.com/");
    }

    #[test]
    fn test_invalid_utf8_body() {
        let err = Response::new("https://s3.amazonaws.com/", response(None, b"\xff\xfe"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ResponseInvalid);
        assert!(err.to_string().contains("https://s3.amazonaws.com/"));
    }

    #[test_case(StatusCode::OK, true)]
    #[test_case(StatusCode::CREATED, true)]
    #[test_case(StatusCode::ACCEPTED, true)]
    #[test_case(StatusCode::NO_CONTENT, true)]
    #[test_case(StatusCode::PARTIAL_CONTENT, false)]
    #[test_case(StatusCode::MOVED_PERMANENTLY, false)]
    #[test_case(StatusCode::NOT_FOUND, false)]
    fn test_is_success(status: StatusCode, expected: bool) {
        let mut resp = response(None, b"");
        *resp.status_mut() = status;
        let resp = Response::new("http://localhost/", resp).unwrap();
        assert_eq!(resp.is_success(), expected);
    }

    #[test]
    fn test_service_error_display() {
        let mut se = ServiceError::new(StatusCode::NOT_FOUND);
        assert_eq!(se.to_string(), "service responded 404 Not Found");

        se.code = Some("NoSuchBucket".to_string());
        se.request_id = Some("4442587FB7D0A2F9".to_string());
        assert_eq!(
            se.to_string(),
            "service responded 404 Not Found, code: NoSuchBucket, request id: 4442587FB7D0A2F9"
        );
    }
}
