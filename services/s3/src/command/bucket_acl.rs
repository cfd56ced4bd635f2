use awsnano_core::{Endpoint, RequestBuilder, Response, RestCommand, Result};
use http::Method;
use log::debug;
use serde::Deserialize;

use super::{bucket_host, bucket_path, from_xml, Owner};
use crate::acl::{Acl, Grant, Grantee, GranteeKind, Permission};
use crate::constants::S3_SERVICE_NAME;

/// `GET /{bucket}?acl`: read the ACL of a bucket.
#[derive(Debug, Clone)]
pub struct GetBucketAcl {
    bucket: String,
}

impl GetBucketAcl {
    /// Create the command.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

/// Result of [`GetBucketAcl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketAcl {
    /// Owner of the bucket.
    pub owner: Option<Owner>,
    /// Grants in the order S3 returned them.
    pub grants: Vec<Grant>,
}

impl From<BucketAcl> for Acl {
    fn from(acl: BucketAcl) -> Self {
        Acl::Grants(acl.grants)
    }
}

impl RestCommand for GetBucketAcl {
    type Output = BucketAcl;

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
        builder.add_query_parameter("acl", "");
        Ok(())
    }

    fn parse_response(&self, resp: &Response) -> Result<BucketAcl> {
        let policy: AccessControlPolicy = from_xml(resp, "AccessControlPolicy")?;

        let mut grants = Vec::with_capacity(policy.access_control_list.grant.len());
        for entry in policy.access_control_list.grant {
            let Some(permission) = entry.permission else {
                debug!("skipping grant without permission in acl of {}", self.bucket);
                continue;
            };
            let Some(grantee) = entry.grantee.into_grantee() else {
                debug!("skipping grant without grantee in acl of {}", self.bucket);
                continue;
            };
            grants.push(Grant::new(grantee, permission));
        }

        Ok(BucketAcl {
            owner: policy.owner,
            grants,
        })
    }
}

/// `PUT /{bucket}?acl`: replace the ACL of a bucket.
#[derive(Debug, Clone)]
pub struct PutBucketAcl {
    bucket: String,
    acl: Acl,
}

impl PutBucketAcl {
    /// Create the command.
    pub fn new(bucket: impl Into<String>, acl: impl Into<Acl>) -> Self {
        Self {
            bucket: bucket.into(),
            acl: acl.into(),
        }
    }
}

impl RestCommand for PutBucketAcl {
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
        self.acl.add_headers(builder);
        Ok(())
    }

    fn add_query_parameters(&self, builder: &mut RequestBuilder) -> Result<()> {
        builder.add_query_parameter("acl", "");
        Ok(())
    }

    fn parse_response(&self, _: &Response) -> Result<()> {
        Ok(())
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AccessControlPolicy {
    owner: Option<Owner>,
    access_control_list: AccessControlList,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AccessControlList {
    grant: Vec<GrantEntry>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct GrantEntry {
    grantee: GranteeEntry,
    permission: Option<Permission>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct GranteeEntry {
    #[serde(rename = "ID")]
    id: Option<String>,
    #[serde(rename = "URI")]
    uri: Option<String>,
    email_address: Option<String>,
    display_name: Option<String>,
}

impl GranteeEntry {
    fn into_grantee(self) -> Option<Grantee> {
        let grantee = if let Some(id) = self.id {
            Grantee::new(GranteeKind::Id, id)
        } else if let Some(uri) = self.uri {
            Grantee::new(GranteeKind::Uri, uri)
        } else if let Some(email) = self.email_address {
            Grantee::new(GranteeKind::EmailAddress, email)
        } else {
            return None;
        };

        Some(match self.display_name {
            Some(name) => grantee.with_display_name(name),
            None => grantee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::CannedAcl;
    use crate::command::tests::{virtual_host, xml_response};
    use awsnano_core::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_acl() {
        let resp = xml_response(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<AccessControlPolicy xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner>
    <ID>75aa57f09aa0c8caeab4f8c24e99d10f8e7faeebf76c078efc7c6caea54ba06a</ID>
    <DisplayName>CustomersName@amazon.com</DisplayName>
  </Owner>
  <AccessControlList>
    <Grant>
      <Grantee xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="CanonicalUser">
        <ID>75aa57f09aa0c8caeab4f8c24e99d10f8e7faeebf76c078efc7c6caea54ba06a</ID>
        <DisplayName>CustomersName@amazon.com</DisplayName>
      </Grantee>
      <Permission>FULL_CONTROL</Permission>
    </Grant>
    <Grant>
      <Grantee xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="Group">
        <URI>http://acs.amazonaws.com/groups/global/AllUsers</URI>
      </Grantee>
      <Permission>READ</Permission>
    </Grant>
    <Grant>
      <Grantee xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="AmazonCustomerByEmail">
        <EmailAddress>xyz@amazon.com</EmailAddress>
      </Grantee>
      <Permission>WRITE_ACP</Permission>
    </Grant>
  </AccessControlList>
</AccessControlPolicy>"#,
        );

        let acl = GetBucketAcl::new("bucket").parse_response(&resp).unwrap();
        assert_eq!(
            acl.owner.as_ref().map(|o| o.id.as_str()),
            Some("75aa57f09aa0c8caeab4f8c24e99d10f8e7faeebf76c078efc7c6caea54ba06a")
        );
        assert_eq!(
            acl.grants,
            vec![
                Grant::new(
                    Grantee::id("75aa57f09aa0c8caeab4f8c24e99d10f8e7faeebf76c078efc7c6caea54ba06a"),
                    Permission::FullControl
                ),
                Grant::new(
                    Grantee::uri("http://acs.amazonaws.com/groups/global/AllUsers"),
                    Permission::Read
                ),
                Grant::new(Grantee::email_address("xyz@amazon.com"), Permission::WriteAcp),
            ]
        );
        assert_eq!(
            acl.grants[0].grantee.display_name(),
            Some("CustomersName@amazon.com")
        );
        assert_eq!(acl.grants[2].grantee.kind(), GranteeKind::EmailAddress);
    }

    #[test]
    fn test_parse_unknown_permission() {
        let resp = xml_response(
            "<AccessControlPolicy><AccessControlList><Grant><Grantee><ID>a</ID></Grantee><Permission>EVERYTHING</Permission></Grant></AccessControlList></AccessControlPolicy>",
        );
        let err = GetBucketAcl::new("bucket").parse_response(&resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseInvalid);
    }

    #[test]
    fn test_acl_query() {
        let mut builder = RequestBuilder::new("s3", virtual_host());
        GetBucketAcl::new("bucket").add_query_parameters(&mut builder).unwrap();
        assert_eq!(
            builder.state().query(),
            &[("acl".to_string(), String::new())]
        );
    }

    #[test]
    fn test_put_acl_headers() {
        let cmd = PutBucketAcl::new("bucket", CannedAcl::Private);
        assert_eq!(cmd.method(), Method::PUT);

        let mut builder = RequestBuilder::new("s3", virtual_host());
        cmd.add_headers(&mut builder).unwrap();
        cmd.add_query_parameters(&mut builder).unwrap();
        assert_eq!(
            builder.state().header("x-amz-acl"),
            Some(&["private".to_string()][..])
        );
        assert_eq!(
            builder.state().query(),
            &[("acl".to_string(), String::new())]
        );
    }
}
