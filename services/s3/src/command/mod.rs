//! Bucket commands of S3.
//!
//! Every command addresses its bucket virtual-host style, as
//! `{bucket}.{endpoint host}`, when the endpoint allows sub-domains, and path
//! style, as `/{bucket}/`, otherwise.

mod bucket_acl;
pub use bucket_acl::{BucketAcl, GetBucketAcl, PutBucketAcl};

mod bucket_cors;
pub use bucket_cors::{GetBucketCors, PutBucketCors};

mod create_bucket;
pub use create_bucket::CreateBucket;

mod head_bucket;
pub use head_bucket::HeadBucket;

mod list_buckets;
pub use list_buckets::{Bucket, ListBuckets, ListBucketsOutput};

mod list_objects;
pub use list_objects::{ListObjects, ListObjectsOutput, Object};

use awsnano_core::{Endpoint, Error, Response, Result};
use quick_xml::de;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Owner of a bucket or an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Owner {
    /// Canonical user id.
    #[serde(rename = "ID")]
    pub id: String,
    /// Display name, not reported in every region.
    #[serde(rename = "DisplayName")]
    pub display_name: Option<String>,
}

fn validate_bucket_name(bucket: &str) -> Result<()> {
    if bucket.is_empty() {
        return Err(Error::request_invalid("bucket name must not be empty"));
    }
    if bucket.contains('/') {
        return Err(Error::request_invalid(format!(
            "bucket name {bucket} must not contain '/'"
        )));
    }
    Ok(())
}

/// Check a query parameter value before it goes into the url.
///
/// Query values are sent unencoded, so a value the service would split or
/// decode differently than it was signed is rejected.
pub(crate) fn query_value<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    match value.chars().find(|c| matches!(c, '&' | '=' | '+' | '#' | '%')) {
        Some(c) => Err(Error::request_invalid(format!(
            "{name} {value:?} must not contain {c:?}"
        ))),
        None => Ok(value),
    }
}

/// Host a bucket is addressed at, `None` for path style.
pub(crate) fn bucket_host(bucket: &str, endpoint: &Endpoint) -> Result<Option<String>> {
    validate_bucket_name(bucket)?;
    if endpoint.allow_sub_domains() {
        Ok(Some(format!("{bucket}.{}", endpoint.host())))
    } else {
        Ok(None)
    }
}

/// Path of a bucket, `/` for virtual-host style.
pub(crate) fn bucket_path(bucket: &str, endpoint: &Endpoint) -> Result<String> {
    validate_bucket_name(bucket)?;
    if endpoint.allow_sub_domains() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{bucket}/"))
    }
}

/// Deserialize the xml body of a successful response.
pub(crate) fn from_xml<T: DeserializeOwned>(resp: &Response, document: &str) -> Result<T> {
    de::from_str(resp.body()).map_err(|e| {
        Error::response_invalid(format!(
            "failed to parse {document} from response of {}",
            resp.url()
        ))
        .with_source(e)
    })
}

/// S3 echoes unset listing parameters as empty elements.
pub(crate) fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|v| !v.is_empty())
}
