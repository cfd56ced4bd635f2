//! Service endpoints.

use std::fmt;
use std::str::FromStr;

use http::Uri;

use crate::{Error, Result};

/// URL scheme an endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain http.
    Http,
    /// http over TLS.
    Https,
}

impl Scheme {
    /// The scheme as used in urls.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            v => Err(Error::config_invalid(format!("unsupported scheme: {v}"))),
        }
    }
}

/// Where requests for a service in a region are sent.
///
/// An endpoint always has at least one scheme and a non-empty host. The host
/// is an authority, so a non-default port is part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    region: String,
    schemes: Vec<Scheme>,
    host: String,
    allow_sub_domains: bool,
    require_content_hash: bool,
}

impl Endpoint {
    /// Create an endpoint from its parts. The first scheme is the preferred one.
    pub fn new(
        region: impl Into<String>,
        schemes: Vec<Scheme>,
        host: impl Into<String>,
        allow_sub_domains: bool,
        require_content_hash: bool,
    ) -> Result<Self> {
        let host = host.into();
        if schemes.is_empty() {
            return Err(Error::config_invalid(format!(
                "endpoint {host} must allow at least one scheme"
            )));
        }
        if host.is_empty() {
            return Err(Error::config_invalid("endpoint host must not be empty"));
        }

        Ok(Self {
            region: region.into(),
            schemes,
            host,
            allow_sub_domains,
            require_content_hash,
        })
    }

    /// Create an endpoint from a url such as `http://127.0.0.1:9000`.
    ///
    /// Only the scheme and the authority of the url are used.
    pub fn from_url(
        region: impl Into<String>,
        url: &str,
        allow_sub_domains: bool,
        require_content_hash: bool,
    ) -> Result<Self> {
        let uri: Uri = url.parse()?;
        let scheme = uri
            .scheme_str()
            .ok_or_else(|| Error::config_invalid(format!("endpoint url {url} has no scheme")))?
            .parse()?;
        let authority = uri
            .authority()
            .ok_or_else(|| Error::config_invalid(format!("endpoint url {url} has no host")))?;

        Self::new(
            region,
            vec![scheme],
            authority.as_str(),
            allow_sub_domains,
            require_content_hash,
        )
    }

    /// Replace the addressing and content hash flags.
    pub fn with_flags(mut self, allow_sub_domains: bool, require_content_hash: bool) -> Self {
        self.allow_sub_domains = allow_sub_domains;
        self.require_content_hash = require_content_hash;
        self
    }

    /// Region of this endpoint.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// All allowed schemes, preferred first.
    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    /// The scheme requests use.
    pub fn preferred_scheme(&self) -> Scheme {
        self.schemes[0]
    }

    /// Host, including a non-default port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether buckets may be addressed as `{bucket}.{host}`.
    pub fn allow_sub_domains(&self) -> bool {
        self.allow_sub_domains
    }

    /// Whether every request must carry `x-amz-content-sha256`.
    pub fn require_content_hash(&self) -> bool {
        self.require_content_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_from_url() {
        let ep = Endpoint::from_url("us-east-1", "http://127.0.0.1:9000", false, false).unwrap();
        assert_eq!(ep.host(), "127.0.0.1:9000");
        assert_eq!(ep.preferred_scheme(), Scheme::Http);
        assert_eq!(ep.schemes(), &[Scheme::Http]);
        assert_eq!(ep.region(), "us-east-1");
        assert!(!ep.allow_sub_domains());
        assert!(!ep.require_content_hash());

        let ep = Endpoint::from_url("eu-west-1", "HTTPS://s3.example.com/ignored", true, true)
            .unwrap();
        assert_eq!(ep.host(), "s3.example.com");
        assert_eq!(ep.preferred_scheme(), Scheme::Https);
    }

    #[test_case("s3.example.com" ; "no scheme")]
    #[test_case("ftp://s3.example.com" ; "unsupported scheme")]
    #[test_case("http://" ; "no host")]
    #[test_case("http://exa mple.com" ; "malformed")]
    fn test_from_url_invalid(url: &str) {
        let err = Endpoint::from_url("us-east-1", url, true, true).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigInvalid, "{url}");
    }

    #[test]
    fn test_new_checks_invariants() {
        assert!(Endpoint::new("us-east-1", vec![], "host", true, true).is_err());
        assert!(Endpoint::new("us-east-1", vec![Scheme::Https], "", true, true).is_err());

        let ep = Endpoint::new(
            "us-east-1",
            vec![Scheme::Https, Scheme::Http],
            "s3.amazonaws.com",
            true,
            true,
        )
        .unwrap();
        assert_eq!(ep.preferred_scheme(), Scheme::Https);
    }
}
