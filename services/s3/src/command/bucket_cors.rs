use awsnano_core::{Endpoint, Error, RequestBuilder, Response, RestCommand, Result};
use http::Method;

use super::{bucket_host, bucket_path};
use crate::constants::S3_SERVICE_NAME;
use crate::cors::Cors;

/// `GET /{bucket}?cors`: read the CORS configuration of a bucket.
#[derive(Debug, Clone)]
pub struct GetBucketCors {
    bucket: String,
}

impl GetBucketCors {
    /// Create the command.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl RestCommand for GetBucketCors {
    type Output = Cors;

    fn service_name(&self) -> &str {
        S3_SERVICE_NAME
    }

    fn host(&self, endpoint: &Endpoint) -> Result<Option<String>> {
        bucket_host(&self.bucket, endpoint)
    }

    fn path(&self, endpoint: &Endpoint) -> Result<String> {
        bucket_path(&self.bucket, endpoint)
    }

    fn add_query_parameters(&self, builder: &mut RequestBuilder) -> Result<()> {
        builder.add_query_parameter("cors", "");
        Ok(())
    }

    fn parse_response(&self, resp: &Response) -> Result<Cors> {
        Cors::from_xml(resp.body()).map_err(|err| {
            Error::response_invalid(format!(
                "failed to parse CORSConfiguration from response of {}",
                resp.url()
            ))
            .with_source(err)
        })
    }
}

/// `PUT /{bucket}?cors`: replace the CORS configuration of a bucket.
#[derive(Debug, Clone)]
pub struct PutBucketCors {
    bucket: String,
    cors: Cors,
}

impl PutBucketCors {
    /// Create the command. The configuration must have at least one rule.
    pub fn new(bucket: impl Into<String>, cors: Cors) -> Self {
        Self {
            bucket: bucket.into(),
            cors,
        }
    }
}

impl RestCommand for PutBucketCors {
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

    fn add_query_parameters(&self, builder: &mut RequestBuilder) -> Result<()> {
        builder.add_query_parameter("cors", "");
        Ok(())
    }

    fn create_body(&self, _: &Endpoint) -> Result<Option<String>> {
        self.cors.to_xml().map(Some)
    }

    fn parse_response(&self, _: &Response) -> Result<()> {
        Ok(())
    }
}
