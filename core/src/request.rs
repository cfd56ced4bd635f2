//! Request builder: accumulate a request, then finalize it into a signed one.

use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use http::{HeaderMap, Method};
use log::{debug, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::canonical::RequestState;
use crate::collator::BinaryCollator;
use crate::constants::{X_AMZ_CONTENT_SHA_256, X_AMZ_DATE};
use crate::credential::Credential;
use crate::encoding::encode_path;
use crate::endpoint::Endpoint;
use crate::hash::{hex_sha256, EMPTY_STRING_SHA256};
use crate::sign::{authorization, signature, string_to_sign, Scope};
use crate::time::{format_iso8601, now, parse_iso8601, DateTime};
use crate::utils::Redact;
use crate::{Error, Result};

/// Bytes a url query can't carry literally. Everything else, `&` and `=`
/// included, goes into the url as given.
const URL_QUERY_ESCAPE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// User agent sent when nothing else is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("awsnano/", env!("CARGO_PKG_VERSION"));

/// What to send as `User-Agent` when the request has none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserAgent {
    /// Send [`DEFAULT_USER_AGENT`].
    #[default]
    Default,
    /// Send the given value.
    Custom(String),
    /// Send no `User-Agent` header.
    Disabled,
}

/// Accumulates one request before signing.
///
/// The builder is consumed by [`RequestBuilder::finalize`], so a request can
/// only be signed once.
///
/// ```
/// use awsnano_core::{Credential, Endpoint, RequestBuilder, Scheme};
///
/// let endpoint = Endpoint::new("us-east-1", vec![Scheme::Https], "s3.amazonaws.com", true, true)?;
/// let mut builder = RequestBuilder::new("s3", endpoint).with_path("/");
/// builder.add_query_parameter("max-keys", "10");
///
/// let signed = builder.finalize(&Credential::new("access_key_id", "secret_access_key"))?;
/// assert!(signed.request().headers().contains_key("authorization"));
/// # Ok::<(), awsnano_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    state: RequestState,
    endpoint: Endpoint,
    body: Bytes,
    time: Option<DateTime>,
    user_agent: UserAgent,
}

impl RequestBuilder {
    /// Create a `GET /` request for a service on the given endpoint.
    pub fn new(service_name: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            state: RequestState::new(service_name),
            endpoint,
            body: Bytes::new(),
            time: None,
            user_agent: UserAgent::Default,
        }
    }

    /// Set the http method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.state.method = method;
        self
    }

    /// Set the url path, unencoded. It is sent percent encoded and is
    /// normalized before signing.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.state.path = path.into();
        self
    }

    /// Send the request to this host instead of the endpoint host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.state.host = Some(host.into());
        self
    }

    /// Set the body. Its hash is computed right away.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.state.body_hash = if body.is_empty() {
            EMPTY_STRING_SHA256.to_string()
        } else {
            hex_sha256(&body)
        };
        self.body = body;
        self
    }

    /// Sign with a fixed time instead of the current one.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Set the user agent policy.
    pub fn with_user_agent(mut self, user_agent: UserAgent) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Append a header value.
    pub fn add_header(&mut self, name: &str, value: impl Into<String>, signed: bool) -> &mut Self {
        self.state.add_header(name, value, signed);
        self
    }

    /// Append a query parameter, unencoded.
    ///
    /// Keys and values go into the url as given, apart from spaces, control
    /// characters, non-ASCII and the few other characters an url can't
    /// carry, which are percent encoded. A value containing `&`, `=`, `+`,
    /// `#` or `%` reaches the service as something else than what was signed,
    /// so callers must not pass one.
    pub fn add_query_parameter(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.state.add_query_parameter(key, value);
        self
    }

    /// The accumulated state.
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// The endpoint this request goes to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Sign the request.
    ///
    /// Adds `Host`, the date header, `User-Agent`, the content hash when the
    /// endpoint requires it, and finally `Authorization`.
    pub fn finalize(mut self, cred: &Credential) -> Result<SignedRequest> {
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "access key id and secret access key must not be empty",
            ));
        }

        let host = self
            .state
            .host
            .clone()
            .unwrap_or_else(|| self.endpoint.host().to_string());
        // A host header added by the caller keeps its signed flag.
        if !self.state.contains_header("host") {
            self.state.set_header("host", host.clone(), true);
        }

        let time = self.normalize_date()?;

        if !self.state.contains_header("user-agent") {
            match &self.user_agent {
                UserAgent::Default => self.state.set_header("user-agent", DEFAULT_USER_AGENT, false),
                UserAgent::Custom(v) => self.state.set_header("user-agent", v.clone(), false),
                UserAgent::Disabled => {}
            }
        }

        if self.endpoint.require_content_hash() && !self.state.contains_header(X_AMZ_CONTENT_SHA_256)
        {
            let hash = self.state.body_hash.clone();
            self.state.set_header(X_AMZ_CONTENT_SHA_256, hash, true);
        }

        let canonical_request = self.state.canonical_request()?;
        debug!("calculated canonical request: {canonical_request}");

        let scope = Scope::new(time, self.endpoint.region(), &self.state.service_name);
        let string_to_sign = string_to_sign(&canonical_request, &scope)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signature = signature(&cred.secret_access_key, &scope, &string_to_sign);
        let authorization = authorization(
            &cred.access_key_id,
            &scope,
            &self.state.canonical_signed_headers(),
            &signature,
        );
        self.state
            .set_header(AUTHORIZATION.as_str(), authorization.clone(), false);

        let request = self.build(&host)?;
        Ok(SignedRequest {
            request,
            artifacts: SigningArtifacts {
                canonical_request,
                string_to_sign,
                authorization,
            },
        })
    }

    /// Keep exactly one date header and return the signing time it carries.
    fn normalize_date(&mut self) -> Result<DateTime> {
        let value = if let Some(date) = self.first_header_value("date") {
            self.state.remove_header(X_AMZ_DATE);
            date
        } else if let Some(date) = self.first_header_value(X_AMZ_DATE) {
            date
        } else {
            let date = format_iso8601(self.time.unwrap_or_else(now));
            self.state.set_header("date", date.clone(), true);
            return parse_iso8601(&date);
        };

        parse_iso8601(value.trim())
    }

    /// First value of a header, reduced to that value and marked signed.
    fn first_header_value(&mut self, name: &str) -> Option<String> {
        let values = self.state.header(name).filter(|v| !v.is_empty())?;
        if values.len() > 1 {
            warn!(
                "request has {} values for header {name}, signing the first one",
                values.len()
            );
        }
        let value = values[0].clone();
        self.state.set_header(name, value.clone(), true);
        Some(value)
    }

    fn build(self, host: &str) -> Result<http::Request<Bytes>> {
        let mut url = format!(
            "{}://{}",
            self.endpoint.preferred_scheme(),
            host.trim_end_matches('/')
        );
        if !self.state.path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&encode_path(&self.state.path));
        for (i, (k, v)) in self.state.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.extend(utf8_percent_encode(k, URL_QUERY_ESCAPE_SET));
            if !v.is_empty() {
                url.push('=');
                url.extend(utf8_percent_encode(v, URL_QUERY_ESCAPE_SET));
            }
        }

        let mut names: Vec<&String> = self.state.headers.keys().collect();
        BinaryCollator::UTF8.sort(&mut names);

        let mut headers = HeaderMap::with_capacity(names.len());
        for name in names {
            let header_name = HeaderName::from_str(name)?;
            for value in &self.state.headers[name] {
                let mut value = HeaderValue::from_str(value)?;
                if header_name == AUTHORIZATION {
                    value.set_sensitive(true);
                }
                headers.append(header_name.clone(), value);
            }
        }

        let mut req = http::Request::builder()
            .method(self.state.method.clone())
            .uri(url)
            .body(self.body)?;
        *req.headers_mut() = headers;
        Ok(req)
    }
}

/// Intermediate results of signing one request.
///
/// They are only useful for comparing against what the service computed
/// when it rejects a signature.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningArtifacts {
    /// The canonical request.
    pub canonical_request: String,
    /// The string to sign.
    pub string_to_sign: String,
    /// The `Authorization` header value.
    pub authorization: String,
}

impl Debug for SigningArtifacts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningArtifacts")
            .field("canonical_request", &self.canonical_request)
            .field("string_to_sign", &self.string_to_sign)
            .field("authorization", &Redact::from(&self.authorization))
            .finish()
    }
}

/// A finalized request, ready to be sent.
#[derive(Debug)]
pub struct SignedRequest {
    request: http::Request<Bytes>,
    artifacts: SigningArtifacts,
}

impl SignedRequest {
    /// The request to send.
    pub fn request(&self) -> &http::Request<Bytes> {
        &self.request
    }

    /// What went into the signature.
    pub fn artifacts(&self) -> &SigningArtifacts {
        &self.artifacts
    }

    /// Split into the request and its signing artifacts.
    pub fn into_parts(self) -> (http::Request<Bytes>, SigningArtifacts) {
        (self.request, self.artifacts)
    }
}
