use awsnano_core::{Endpoint, Error, RequestBuilder, Response, RestCommand, Result};
use http::header::CONTENT_TYPE;
use http::Method;
use quick_xml::se;
use serde::Serialize;

use super::{bucket_host, bucket_path};
use crate::acl::Acl;
use crate::constants::{S3_SERVICE_NAME, S3_XMLNS, US_EAST_1};

/// `PUT /{bucket}`: create a bucket in the region of the endpoint.
#[derive(Debug, Clone)]
pub struct CreateBucket {
    bucket: String,
    acl: Option<Acl>,
}

impl CreateBucket {
    /// Create a bucket with the default, private, ACL.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            acl: None,
        }
    }

    /// Apply an ACL at creation.
    pub fn with_acl(mut self, acl: impl Into<Acl>) -> Self {
        self.acl = Some(acl.into());
        self
    }
}

impl RestCommand for CreateBucket {
    type Output = ();

    fn service_name(&self) -> &str {
        S3_SERVICE_NAME
    }

    fn method(&self) -> Method {
        Method::PUT
    }

    fn host(&self, endpoint: &Endpoint) -> Result<Option<String>> {
        bucket_host(&self.bucket, endpoint)
    }

    fn path(&self, endpoint: &Endpoint) -> Result<String> {
        bucket_path(&self.bucket, endpoint)
    }

    fn add_headers(&self, builder: &mut RequestBuilder) -> Result<()> {
        if let Some(acl) = &self.acl {
            acl.add_headers(builder);
        }
        if builder.endpoint().region() != US_EAST_1 {
            builder.add_header(CONTENT_TYPE.as_str(), "text/plain", true);
        }
        Ok(())
    }

    // us-east-1 is the default location and must not be sent as a constraint.
    fn create_body(&self, endpoint: &Endpoint) -> Result<Option<String>> {
        if endpoint.region() == US_EAST_1 {
            return Ok(None);
        }

        let doc = CreateBucketConfiguration {
            xmlns: S3_XMLNS,
            location_constraint: endpoint.region(),
        };
        se::to_string(&doc).map(Some).map_err(|e| {
            Error::unexpected("failed to serialize create bucket configuration").with_source(e)
        })
    }

    fn parse_response(&self, _: &Response) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "CreateBucketConfiguration")]
struct CreateBucketConfiguration<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'a str,
    #[serde(rename = "LocationConstraint")]
    location_constraint: &'a str,
}
