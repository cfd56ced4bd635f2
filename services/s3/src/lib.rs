//! S3 bucket operations for awsnano.
//!
//! [`S3Client`] sends the bucket commands through the signing engine of
//! `awsnano-core`. Each command is also usable on its own with
//! [`awsnano_core::Commands`].
//!
//! ```no_run
//! use awsnano_core::Context;
//! use awsnano_s3::{CannedAcl, ListObjects, S3Client};
//!
//! # async fn example(ctx: Context) -> awsnano_core::Result<()> {
//! let client = S3Client::load(ctx).await?;
//! client.create_bucket("my-bucket", Some(CannedAcl::Private.into())).await?;
//!
//! let page = client
//!     .list_objects(&ListObjects::new("my-bucket").with_prefix("logs/"))
//!     .await?;
//! for object in page.contents {
//!     println!("{} {}", object.key, object.size);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod constants;
pub use constants::{S3_REGIONS, S3_SERVICE_NAME};

mod acl;
pub use acl::{Acl, CannedAcl, Grant, Grantee, GranteeKind, Permission};

mod cors;
pub use cors::{Cors, CorsRule};

mod endpoint;
pub use endpoint::S3EndpointResolver;

mod error;
pub use error::S3ErrorParser;

pub mod command;
pub use command::{
    Bucket, BucketAcl, CreateBucket, GetBucketAcl, GetBucketCors, HeadBucket, ListBuckets,
    ListBucketsOutput, ListObjects, ListObjectsOutput, Object, Owner, PutBucketAcl, PutBucketCors,
};

mod client;
pub use client::S3Client;
