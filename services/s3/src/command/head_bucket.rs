use awsnano_core::{Endpoint, Response, RestCommand, Result};
use http::Method;

use super::{bucket_host, bucket_path};
use crate::constants::S3_SERVICE_NAME;

/// `HEAD /{bucket}`: check that a bucket exists and is accessible.
///
/// A missing bucket fails with a service error carrying `404`.
#[derive(Debug, Clone)]
pub struct HeadBucket {
    bucket: String,
}

impl HeadBucket {
    /// Create the command.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl RestCommand for HeadBucket {
    type Output = ();

    fn service_name(&self) -> &str {
        S3_SERVICE_NAME
    }

    fn method(&self) -> Method {
        Method::HEAD
    }

    fn host(&self, endpoint: &Endpoint) -> Result<Option<String>> {
        bucket_host(&self.bucket, endpoint)
    }

    fn path(&self, endpoint: &Endpoint) -> Result<String> {
        bucket_path(&self.bucket, endpoint)
    }

    fn parse_response(&self, _: &Response) -> Result<()> {
        Ok(())
    }
}
