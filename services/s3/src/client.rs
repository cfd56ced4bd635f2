use awsnano_core::{Commands, Config, Context, Result};

use crate::acl::Acl;
use crate::command::*;
use crate::cors::Cors;
use crate::endpoint::S3EndpointResolver;
use crate::error::S3ErrorParser;

/// Client for the bucket operations of S3.
#[derive(Debug, Clone)]
pub struct S3Client {
    commands: Commands,
}

impl S3Client {
    /// Create a client on the built-in endpoint table.
    pub fn new(ctx: Context, config: Config) -> Self {
        Self::with_resolver(ctx, config, S3EndpointResolver::new())
    }

    /// Create a client on a custom endpoint table.
    pub fn with_resolver(ctx: Context, config: Config, resolver: S3EndpointResolver) -> Self {
        Self {
            commands: Commands::new(ctx, config, resolver, S3ErrorParser),
        }
    }

    /// Create a client with the config loaded from env and profile files.
    pub async fn load(ctx: Context) -> Result<Self> {
        let config = Config::load(&ctx).await?;
        Ok(Self::new(ctx, config))
    }

    /// The executor, for running commands directly.
    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    /// List the buckets of the account.
    pub async fn list_buckets(&self) -> Result<ListBucketsOutput> {
        self.commands.execute(&ListBuckets).await
    }

    /// List objects of a bucket.
    pub async fn list_objects(&self, cmd: &ListObjects) -> Result<ListObjectsOutput> {
        self.commands.execute(cmd).await
    }

    /// Check that a bucket exists and is accessible.
    pub async fn head_bucket(&self, bucket: &str) -> Result<()> {
        self.commands.execute(&HeadBucket::new(bucket)).await
    }

    /// Create a bucket in the configured region.
    pub async fn create_bucket(&self, bucket: &str, acl: Option<Acl>) -> Result<()> {
        let mut cmd = CreateBucket::new(bucket);
        if let Some(acl) = acl {
            cmd = cmd.with_acl(acl);
        }
        self.commands.execute(&cmd).await
    }

    /// Read the ACL of a bucket.
    pub async fn get_bucket_acl(&self, bucket: &str) -> Result<BucketAcl> {
        self.commands.execute(&GetBucketAcl::new(bucket)).await
    }

    /// Replace the ACL of a bucket.
    pub async fn put_bucket_acl(&self, bucket: &str, acl: impl Into<Acl>) -> Result<()> {
        self.commands
            .execute(&PutBucketAcl::new(bucket, acl))
            .await
    }

    /// Read the CORS configuration of a bucket.
    pub async fn get_bucket_cors(&self, bucket: &str) -> Result<Cors> {
        self.commands.execute(&GetBucketCors::new(bucket)).await
    }

    /// Replace the CORS configuration of a bucket.
    pub async fn put_bucket_cors(&self, bucket: &str, cors: Cors) -> Result<()> {
        self.commands
            .execute(&PutBucketCors::new(bucket, cors))
            .await
    }
}
