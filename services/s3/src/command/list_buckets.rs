use awsnano_core::time::{parse_rfc3339, DateTime};
use awsnano_core::{Endpoint, Response, RestCommand, Result};
use serde::Deserialize;

use super::{from_xml, Owner};
use crate::constants::S3_SERVICE_NAME;

/// `GET /`: list the buckets of the authenticated account.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListBuckets;

/// Result of [`ListBuckets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBucketsOutput {
    /// Owner of the buckets.
    pub owner: Option<Owner>,
    /// Buckets in the order S3 returned them.
    pub buckets: Vec<Bucket>,
}

/// A bucket as listed by [`ListBuckets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime,
}

impl RestCommand for ListBuckets {
    type Output = ListBucketsOutput;

    fn service_name(&self) -> &str {
        S3_SERVICE_NAME
    }

    fn path(&self, _: &Endpoint) -> Result<String> {
        Ok("/".to_string())
    }

    fn parse_response(&self, resp: &Response) -> Result<ListBucketsOutput> {
        let result: ListAllMyBucketsResult = from_xml(resp, "ListAllMyBucketsResult")?;

        let buckets = result
            .buckets
            .bucket
            .into_iter()
            .map(|b| {
                Ok(Bucket {
                    creation_date: parse_rfc3339(&b.creation_date)?,
                    name: b.name,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ListBucketsOutput {
            owner: result.owner,
            buckets,
        })
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ListAllMyBucketsResult {
    owner: Option<Owner>,
    buckets: Buckets,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Buckets {
    bucket: Vec<BucketEntry>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BucketEntry {
    name: String,
    creation_date: String,
}
