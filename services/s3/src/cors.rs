//! Bucket CORS configuration.

use awsnano_core::{Error, Result};
use http::Method;
use log::debug;
use quick_xml::{de, se};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_CORS_RULES;

/// One cross-origin rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsRule {
    id: Option<String>,
    allowed_origins: Vec<String>,
    allowed_methods: Vec<Method>,
    max_age_seconds: Option<u32>,
    expose_headers: Vec<String>,
}

impl CorsRule {
    /// A rule allowing `methods` from `origins`.
    ///
    /// Both need at least one entry. Duplicates are dropped.
    pub fn new<O, M>(origins: O, methods: M) -> Result<Self>
    where
        O: IntoIterator,
        O::Item: Into<String>,
        M: IntoIterator<Item = Method>,
    {
        let allowed_origins = dedup(origins.into_iter().map(Into::into));
        let allowed_methods = dedup(methods);
        if allowed_origins.is_empty() {
            return Err(Error::request_invalid(
                "cors rule needs at least one allowed origin",
            ));
        }
        if allowed_methods.is_empty() {
            return Err(Error::request_invalid(
                "cors rule needs at least one allowed method",
            ));
        }

        Ok(Self {
            id: None,
            allowed_origins,
            allowed_methods,
            max_age_seconds: None,
            expose_headers: Vec::new(),
        })
    }

    /// Name the rule.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// How long browsers may cache the preflight response.
    pub fn with_max_age_seconds(mut self, max_age_seconds: u32) -> Self {
        self.max_age_seconds = Some(max_age_seconds);
        self
    }

    /// Response headers browsers may expose to scripts.
    pub fn with_expose_headers<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut all = std::mem::take(&mut self.expose_headers);
        all.extend(headers.into_iter().map(Into::into));
        self.expose_headers = dedup(all);
        self
    }

    /// Rule id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Allowed origins.
    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    /// Allowed methods.
    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    /// Preflight cache time.
    pub fn max_age_seconds(&self) -> Option<u32> {
        self.max_age_seconds
    }

    /// Exposed headers.
    pub fn expose_headers(&self) -> &[String] {
        &self.expose_headers
    }
}

/// CORS configuration of a bucket, up to 100 rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cors {
    rules: Vec<CorsRule>,
}

impl Cors {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. A rule equal to an existing one is ignored.
    pub fn add_rule(&mut self, rule: CorsRule) -> Result<&mut Self> {
        if self.rules.contains(&rule) {
            return Ok(self);
        }
        if self.rules.len() >= MAX_CORS_RULES {
            return Err(Error::request_invalid(format!(
                "cors configuration must not have more than {MAX_CORS_RULES} rules"
            )));
        }
        self.rules.push(rule);
        Ok(self)
    }

    /// Builder style [`Cors::add_rule`].
    pub fn with_rule(mut self, rule: CorsRule) -> Result<Self> {
        self.add_rule(rule)?;
        Ok(self)
    }

    /// Rules in insertion order.
    pub fn rules(&self) -> &[CorsRule] {
        &self.rules
    }

    /// The `CORSConfiguration` document to send.
    pub(crate) fn to_xml(&self) -> Result<String> {
        if self.rules.is_empty() {
            return Err(Error::request_invalid(
                "cors configuration needs at least one rule",
            ));
        }

        let doc = CorsConfiguration {
            rules: self
                .rules
                .iter()
                .map(|r| CorsRuleXml {
                    id: r.id.clone(),
                    allowed_origin: r.allowed_origins.clone(),
                    allowed_method: r.allowed_methods.iter().map(|m| m.to_string()).collect(),
                    max_age_seconds: r.max_age_seconds,
                    expose_header: r.expose_headers.clone(),
                })
                .collect(),
        };
        se::to_string(&doc).map_err(|e| {
            Error::request_invalid("failed to serialize cors configuration").with_source(e)
        })
    }

    /// Parse a `CORSConfiguration` document.
    ///
    /// Rules without origins or methods can't be sent back and are skipped.
    pub(crate) fn from_xml(xml: &str) -> Result<Self> {
        let doc: CorsConfiguration = de::from_str(xml).map_err(|e| {
            Error::response_invalid("failed to parse cors configuration").with_source(e)
        })?;

        let mut rules = Vec::with_capacity(doc.rules.len());
        for r in doc.rules {
            let methods = r
                .allowed_method
                .iter()
                .map(|m| {
                    Method::from_bytes(m.as_bytes()).map_err(|e| {
                        Error::response_invalid(format!("invalid cors method {m}")).with_source(e)
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let rule = match CorsRule::new(r.allowed_origin, methods) {
                Ok(rule) => rule,
                Err(err) => {
                    debug!("skipping cors rule {:?}: {err}", r.id);
                    continue;
                }
            };
            let rule = rule.with_expose_headers(r.expose_header);
            let rule = match r.max_age_seconds {
                Some(v) => rule.with_max_age_seconds(v),
                None => rule,
            };
            rules.push(match r.id {
                Some(id) => rule.with_id(id),
                None => rule,
            });
        }
        Ok(Self { rules })
    }
}

fn dedup<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[derive(Default, Debug, Serialize, Deserialize)]
#[serde(default, rename = "CORSConfiguration")]
struct CorsConfiguration {
    #[serde(rename = "CORSRule")]
    rules: Vec<CorsRuleXml>,
}

#[derive(Default, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CorsRuleXml {
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    allowed_origin: Vec<String>,
    allowed_method: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_age_seconds: Option<u32>,
    expose_header: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsnano_core::ErrorKind;
    use pretty_assertions::assert_eq;

    fn rule(origin: &str) -> CorsRule {
        CorsRule::new([origin], [Method::GET]).unwrap()
    }

    #[test]
    fn test_rule_requires_origin_and_method() {
        let err = CorsRule::new(Vec::<String>::new(), [Method::GET]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        let err = CorsRule::new(["*"], Vec::<Method>::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_rule_dedup() {
        let rule = CorsRule::new(["*", "*"], [Method::GET, Method::PUT, Method::GET])
            .unwrap()
            .with_expose_headers(["ETag", "ETag", "x-amz-request-id"]);
        assert_eq!(rule.allowed_origins(), &["*".to_string()]);
        assert_eq!(rule.allowed_methods(), &[Method::GET, Method::PUT]);
        assert_eq!(
            rule.expose_headers(),
            &["ETag".to_string(), "x-amz-request-id".to_string()]
        );
    }

    #[test]
    fn test_max_rules() {
        let mut cors = Cors::new();
        for i in 0..MAX_CORS_RULES {
            cors.add_rule(rule(&format!("https://{i}.example.com")))
                .unwrap();
        }
        cors.add_rule(rule("https://0.example.com")).unwrap();
        assert_eq!(cors.rules().len(), MAX_CORS_RULES);

        let err = cors.add_rule(rule("https://more.example.com")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_empty_to_xml() {
        let err = Cors::new().to_xml().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_to_xml() {
        let cors = Cors::new()
            .with_rule(
                CorsRule::new(["http://www.example.com"], [Method::PUT, Method::POST])
                    .unwrap()
                    .with_id("write")
                    .with_max_age_seconds(3000)
                    .with_expose_headers(["x-amz-server-side-encryption"]),
            )
            .unwrap()
            .with_rule(rule("*"))
            .unwrap();

        let xml = cors.to_xml().unwrap();
        assert!(xml.starts_with("<CORSConfiguration><CORSRule><ID>write</ID>"));
        assert!(xml.contains(
            "<AllowedOrigin>http://www.example.com</AllowedOrigin><AllowedMethod>PUT</AllowedMethod><AllowedMethod>POST</AllowedMethod><MaxAgeSeconds>3000</MaxAgeSeconds>"
        ));
        assert!(xml.contains("<CORSRule><AllowedOrigin>*</AllowedOrigin><AllowedMethod>GET</AllowedMethod></CORSRule>"));

        assert_eq!(Cors::from_xml(&xml).unwrap(), cors);
    }

    #[test]
    fn test_from_xml() {
        let cors = Cors::from_xml(
            r#"<CORSConfiguration xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <CORSRule>
    <AllowedOrigin>http://www.example.com</AllowedOrigin>
    <AllowedMethod>PUT</AllowedMethod>
    <AllowedMethod>DELETE</AllowedMethod>
    <AllowedHeader>*</AllowedHeader>
    <MaxAgeSeconds>3000</MaxAgeSeconds>
    <ExposeHeader>x-amz-server-side-encryption</ExposeHeader>
    <ExposeHeader>x-amz-request-id</ExposeHeader>
  </CORSRule>
  <CORSRule>
    <ID>read</ID>
    <AllowedOrigin>*</AllowedOrigin>
    <AllowedMethod>GET</AllowedMethod>
  </CORSRule>
</CORSConfiguration>"#,
        )
        .unwrap();

        let rules = cors.rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id(), None);
        assert_eq!(rules[0].allowed_methods(), &[Method::PUT, Method::DELETE]);
        assert_eq!(rules[0].max_age_seconds(), Some(3000));
        assert_eq!(
            rules[0].expose_headers(),
            &[
                "x-amz-server-side-encryption".to_string(),
                "x-amz-request-id".to_string()
            ]
        );
        assert_eq!(rules[1].id(), Some("read"));
        assert_eq!(rules[1].allowed_origins(), &["*".to_string()]);
    }

    #[test]
    fn test_from_xml_skips_incomplete_rule() {
        let cors = Cors::from_xml(
            "<CORSConfiguration><CORSRule><AllowedOrigin>*</AllowedOrigin></CORSRule></CORSConfiguration>",
        )
        .unwrap();
        assert!(cors.rules().is_empty());
    }
}
