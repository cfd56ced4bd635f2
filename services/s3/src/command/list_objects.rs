use awsnano_core::time::{parse_rfc3339, DateTime};
use awsnano_core::{Endpoint, RequestBuilder, Response, RestCommand, Result};
use serde::Deserialize;

use super::{bucket_host, bucket_path, from_xml, non_empty, query_value, Owner};
use crate::constants::{DEFAULT_MAX_KEYS, S3_SERVICE_NAME};

/// `GET /{bucket}`: list objects of a bucket.
///
/// Parameter values are put into the url unencoded. Values containing `&`,
/// `=`, `+`, `#` or `%` are rejected with [`ErrorKind::RequestInvalid`]
/// before anything is sent.
///
/// [`ErrorKind::RequestInvalid`]: awsnano_core::ErrorKind::RequestInvalid
#[derive(Debug, Clone, Default)]
pub struct ListObjects {
    bucket: String,
    delimiter: Option<String>,
    encoding_type: Option<String>,
    marker: Option<String>,
    max_keys: Option<u32>,
    prefix: Option<String>,
}

impl ListObjects {
    /// List every object of a bucket, 1000 at a time.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Group keys sharing a prefix up to the delimiter into common prefixes.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Ask S3 to encode keys in the response, only `url` is supported.
    pub fn with_encoding_type(mut self, encoding_type: impl Into<String>) -> Self {
        self.encoding_type = Some(encoding_type.into());
        self
    }

    /// Start listing after this key.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Most keys to return.
    pub fn with_max_keys(mut self, max_keys: u32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    /// Only list keys starting with this prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// Result of [`ListObjects`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObjectsOutput {
    /// Bucket name.
    pub name: String,
    /// Prefix the listing was limited to.
    pub prefix: Option<String>,
    /// Delimiter the listing was grouped by.
    pub delimiter: Option<String>,
    /// Encoding applied to keys.
    pub encoding_type: Option<String>,
    /// Marker the listing started after.
    pub marker: Option<String>,
    /// Marker for the next page, only sent with a delimiter.
    pub next_marker: Option<String>,
    /// Most keys the page could hold.
    pub max_keys: u32,
    /// Whether more keys follow.
    pub is_truncated: bool,
    /// Objects of this page.
    pub contents: Vec<Object>,
    /// Prefixes rolled up by the delimiter.
    pub common_prefixes: Vec<String>,
}

/// An object as listed by [`ListObjects`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Object key.
    pub key: String,
    /// Last modification time.
    pub last_modified: DateTime,
    /// Entity tag, quotes included.
    pub etag: String,
    /// Size in bytes.
    pub size: u64,
    /// Storage class.
    pub storage_class: Option<String>,
    /// Owner of the object.
    pub owner: Option<Owner>,
}

impl RestCommand for ListObjects {
    type Output = ListObjectsOutput;

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
        let params = [
            ("delimiter", self.delimiter.clone()),
            ("encoding-type", self.encoding_type.clone()),
            ("marker", self.marker.clone()),
            ("max-keys", self.max_keys.map(|v| v.to_string())),
            ("prefix", self.prefix.clone()),
        ];
        for (key, value) in params {
            if let Some(value) = value {
                builder.add_query_parameter(key, query_value(key, &value)?);
            }
        }
        Ok(())
    }

    fn parse_response(&self, resp: &Response) -> Result<ListObjectsOutput> {
        let result: ListBucketResult = from_xml(resp, "ListBucketResult")?;

        let contents = result
            .contents
            .into_iter()
            .map(|c| {
                Ok(Object {
                    last_modified: parse_rfc3339(&c.last_modified)?,
                    key: c.key,
                    etag: c.etag,
                    size: c.size,
                    storage_class: non_empty(c.storage_class),
                    owner: c.owner,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ListObjectsOutput {
            name: result.name,
            prefix: non_empty(result.prefix),
            delimiter: non_empty(result.delimiter),
            encoding_type: non_empty(result.encoding_type),
            marker: non_empty(result.marker),
            next_marker: non_empty(result.next_marker),
            max_keys: result.max_keys.unwrap_or(DEFAULT_MAX_KEYS),
            is_truncated: result.is_truncated,
            contents,
            common_prefixes: result
                .common_prefixes
                .into_iter()
                .map(|p| p.prefix)
                .collect(),
        })
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ListBucketResult {
    name: String,
    prefix: Option<String>,
    delimiter: Option<String>,
    encoding_type: Option<String>,
    marker: Option<String>,
    next_marker: Option<String>,
    max_keys: Option<u32>,
    is_truncated: bool,
    contents: Vec<Contents>,
    common_prefixes: Vec<CommonPrefix>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Contents {
    key: String,
    last_modified: String,
    #[serde(rename = "ETag")]
    etag: String,
    size: u64,
    storage_class: Option<String>,
    owner: Option<Owner>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CommonPrefix {
    prefix: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::{path_style, virtual_host, xml_response};
    use awsnano_core::ErrorKind;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request() {
        let cmd = ListObjects::new("photos")
            .with_prefix("2006/")
            .with_delimiter("/")
            .with_max_keys(40);

        assert_eq!(
            cmd.host(&virtual_host()).unwrap().as_deref(),
            Some("photos.s3-us-west-2.s3.amazonaws.com")
        );
        assert_eq!(cmd.path(&path_style()).unwrap(), "/photos/");

        let mut builder = RequestBuilder::new("s3", virtual_host());
        cmd.add_query_parameters(&mut builder).unwrap();
        assert_eq!(
            builder.state().query(),
            &[
                ("delimiter".to_string(), "/".to_string()),
                ("max-keys".to_string(), "40".to_string()),
                ("prefix".to_string(), "2006/".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_query_by_default() {
        let mut builder = RequestBuilder::new("s3", virtual_host());
        ListObjects::new("photos")
            .add_query_parameters(&mut builder)
            .unwrap();
        assert!(builder.state().query().is_empty());
    }

    #[test]
    fn test_reject_unsafe_query_value() {
        let mut builder = RequestBuilder::new("s3", virtual_host());
        let err = ListObjects::new("photos")
            .with_prefix("a&b=c")
            .add_query_parameters(&mut builder)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);

        let err = ListObjects::new("photos")
            .with_marker("100%")
            .add_query_parameters(&mut builder)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_parse_list_objects() {
        let resp = xml_response(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>bucket</Name>
  <Prefix/>
  <Marker/>
  <MaxKeys>1000</MaxKeys>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>my-image.jpg</Key>
    <LastModified>2009-10-12T17:50:30.000Z</LastModified>
    <ETag>&quot;fba9dede5f27731c9771645a39863328&quot;</ETag>
    <Size>434234</Size>
    <StorageClass>STANDARD</StorageClass>
    <Owner>
      <ID>75aa57f09aa0c8caeab4f8c24e99d10f8e7faeebf76c078efc7c6caea54ba06a</ID>
      <DisplayName>mtd@amazon.com</DisplayName>
    </Owner>
  </Contents>
  <Contents>
    <Key>my-third-image.jpg</Key>
    <LastModified>2009-10-12T17:50:30.000Z</LastModified>
    <ETag>&quot;1b2cf535f27731c974343645a3985328&quot;</ETag>
    <Size>64994</Size>
    <StorageClass>STANDARD_IA</StorageClass>
  </Contents>
</ListBucketResult>"#,
        );

        let out = ListObjects::new("bucket").parse_response(&resp).unwrap();
        assert_eq!(out.name, "bucket");
        assert_eq!(out.prefix, None);
        assert_eq!(out.marker, None);
        assert_eq!(out.max_keys, 1000);
        assert!(!out.is_truncated);
        assert!(out.common_prefixes.is_empty());
        assert_eq!(out.contents.len(), 2);

        let first = &out.contents[0];
        assert_eq!(first.key, "my-image.jpg");
        assert_eq!(
            first.last_modified,
            Utc.with_ymd_and_hms(2009, 10, 12, 17, 50, 30).unwrap()
        );
        assert_eq!(first.etag, "\"fba9dede5f27731c9771645a39863328\"");
        assert_eq!(first.size, 434234);
        assert_eq!(first.storage_class.as_deref(), Some("STANDARD"));
        assert_eq!(
            first.owner.as_ref().and_then(|o| o.display_name.as_deref()),
            Some("mtd@amazon.com")
        );
        assert_eq!(out.contents[1].owner, None);
    }

    #[test]
    fn test_parse_common_prefixes() {
        let resp = xml_response(
            r#"<ListBucketResult>
  <Name>example-bucket</Name>
  <Prefix>photos/2006/</Prefix>
  <Marker></Marker>
  <NextMarker>photos/2006/March/</NextMarker>
  <MaxKeys>2</MaxKeys>
  <Delimiter>/</Delimiter>
  <IsTruncated>true</IsTruncated>
  <CommonPrefixes>
    <Prefix>photos/2006/February/</Prefix>
  </CommonPrefixes>
  <CommonPrefixes>
    <Prefix>photos/2006/January/</Prefix>
  </CommonPrefixes>
</ListBucketResult>"#,
        );

        let out = ListObjects::new("example-bucket")
            .parse_response(&resp)
            .unwrap();
        assert_eq!(out.prefix.as_deref(), Some("photos/2006/"));
        assert_eq!(out.delimiter.as_deref(), Some("/"));
        assert_eq!(out.next_marker.as_deref(), Some("photos/2006/March/"));
        assert_eq!(out.max_keys, 2);
        assert!(out.is_truncated);
        assert!(out.contents.is_empty());
        assert_eq!(
            out.common_prefixes,
            vec![
                "photos/2006/February/".to_string(),
                "photos/2006/January/".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_default_max_keys() {
        let resp = xml_response("<ListBucketResult><Name>b</Name></ListBucketResult>");
        let out = ListObjects::new("b").parse_response(&resp).unwrap();
        assert_eq!(out.max_keys, DEFAULT_MAX_KEYS);
        assert!(!out.is_truncated);
    }

    #[test]
    fn test_parse_bad_size() {
        let resp = xml_response(
            "<ListBucketResult><Contents><Key>a</Key><Size>many</Size></Contents></ListBucketResult>",
        );
        let err = ListObjects::new("b").parse_response(&resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseInvalid);
    }
}
