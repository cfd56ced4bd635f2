//! Bucket access control lists.

use std::fmt;

use awsnano_core::RequestBuilder;
use serde::Deserialize;

use crate::constants::*;

/// A predefined grant set, sent as `x-amz-acl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedAcl {
    /// Owner gets `FULL_CONTROL`, nobody else has access.
    Private,
    /// Everyone may read.
    PublicRead,
    /// Everyone may read and write.
    PublicReadWrite,
    /// EC2 may read AMI bundles.
    AwsExecRead,
    /// Authenticated users may read.
    AuthenticatedRead,
}

impl CannedAcl {
    /// Value of the `x-amz-acl` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
            CannedAcl::PublicReadWrite => "public-read-write",
            CannedAcl::AwsExecRead => "aws-exec-read",
            CannedAcl::AuthenticatedRead => "authenticated-read",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a grant allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// All of the permissions below.
    FullControl,
    /// List the bucket.
    Read,
    /// Create, overwrite and delete objects.
    Write,
    /// Read the ACL.
    ReadAcp,
    /// Write the ACL.
    WriteAcp,
}

impl Permission {
    /// Header that carries the grantees of this permission.
    pub fn header_name(&self) -> &'static str {
        match self {
            Permission::FullControl => X_AMZ_GRANT_FULL_CONTROL,
            Permission::Read => X_AMZ_GRANT_READ,
            Permission::Write => X_AMZ_GRANT_WRITE,
            Permission::ReadAcp => X_AMZ_GRANT_READ_ACP,
            Permission::WriteAcp => X_AMZ_GRANT_WRITE_ACP,
        }
    }
}

/// How a grantee is identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GranteeKind {
    /// Canonical user id.
    Id,
    /// Predefined group uri.
    Uri,
    /// Email address of an AWS account.
    EmailAddress,
}

impl GranteeKind {
    fn key(&self) -> &'static str {
        match self {
            GranteeKind::Id => "id",
            GranteeKind::Uri => "uri",
            GranteeKind::EmailAddress => "emailAddress",
        }
    }
}

/// Someone a permission is granted to.
///
/// Two grantees are equal when kind and value match; the display name S3
/// reports is informational.
#[derive(Debug, Clone)]
pub struct Grantee {
    kind: GranteeKind,
    value: String,
    display_name: Option<String>,
}

impl Grantee {
    /// A grantee of the given kind.
    pub fn new(kind: GranteeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            display_name: None,
        }
    }

    /// A canonical user.
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(GranteeKind::Id, id)
    }

    /// A predefined group, such as `http://acs.amazonaws.com/groups/global/AllUsers`.
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::new(GranteeKind::Uri, uri)
    }

    /// An AWS account by email address.
    pub fn email_address(email: impl Into<String>) -> Self {
        Self::new(GranteeKind::EmailAddress, email)
    }

    /// Attach a display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// How the grantee is identified.
    pub fn kind(&self) -> GranteeKind {
        self.kind
    }

    /// The id, uri or email address.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Display name, only reported for canonical users.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl PartialEq for Grantee {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

impl Eq for Grantee {}

/// Formats as used in `x-amz-grant-*` headers: `id="..."`.
impl fmt::Display for Grantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.kind.key(), self.value)
    }
}

/// One permission for one grantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Who is granted.
    pub grantee: Grantee,
    /// What is granted.
    pub permission: Permission,
}

impl Grant {
    /// Create a grant.
    pub fn new(grantee: Grantee, permission: Permission) -> Self {
        Self {
            grantee,
            permission,
        }
    }
}

/// An ACL to apply to a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acl {
    /// A predefined grant set.
    Canned(CannedAcl),
    /// Explicit grants.
    Grants(Vec<Grant>),
}

impl From<CannedAcl> for Acl {
    fn from(acl: CannedAcl) -> Self {
        Acl::Canned(acl)
    }
}

impl From<Vec<Grant>> for Acl {
    fn from(grants: Vec<Grant>) -> Self {
        Acl::Grants(grants)
    }
}

impl Acl {
    /// Add the signed ACL headers to a request.
    ///
    /// Grants are grouped per permission into one `x-amz-grant-*` header
    /// each, grantees joined by `, ` in the order first seen.
    pub fn add_headers(&self, builder: &mut RequestBuilder) {
        let grants = match self {
            Acl::Canned(acl) => {
                builder.add_header(X_AMZ_ACL, acl.as_str(), true);
                return;
            }
            Acl::Grants(grants) => grants,
        };

        let mut groups: Vec<(Permission, Vec<&Grantee>)> = Vec::new();
        for grant in grants {
            let idx = match groups.iter().position(|(p, _)| *p == grant.permission) {
                Some(idx) => idx,
                None => {
                    groups.push((grant.permission, Vec::new()));
                    groups.len() - 1
                }
            };
            let grantees = &mut groups[idx].1;
            if !grantees.contains(&&grant.grantee) {
                grantees.push(&grant.grantee);
            }
        }

        for (permission, grantees) in groups {
            let value = grantees
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            builder.add_header(permission.header_name(), value, true);
        }
    }
}
