//! Core of awsnano: AWS Signature Version 4 signing for object storage.
//!
//! The crate turns an unsigned request description into a request that an
//! AWS compatible service accepts. Signing is pure: it never performs I/O and
//! only depends on the request, the credential and the signing time.
//!
//! ## Overview
//!
//! - [`RequestBuilder`]: accumulates method, path, headers, query and body,
//!   then [`RequestBuilder::finalize`] signs it into a [`SignedRequest`].
//! - [`Config`]: region, endpoint and credential, loaded from env and the
//!   `~/.aws` profile files through a [`Context`].
//! - [`Commands`]: executes [`RestCommand`]s, sending them with the
//!   [`HttpSend`] of the context and turning failures into [`ServiceError`]s.
//!
//! ## Example
//!
//! ```
//! use awsnano_core::{Credential, Endpoint, RequestBuilder, Scheme};
//! use http::Method;
//!
//! # fn main() -> awsnano_core::Result<()> {
//! let endpoint = Endpoint::new(
//!     "us-east-1",
//!     vec![Scheme::Https, Scheme::Http],
//!     "s3.amazonaws.com",
//!     true,
//!     true,
//! )?;
//!
//! let mut builder = RequestBuilder::new("s3", endpoint)
//!     .with_method(Method::PUT)
//!     .with_host("my-bucket.s3.amazonaws.com")
//!     .with_body("hello");
//! builder.add_header("x-amz-acl", "private", true);
//!
//! let signed = builder.finalize(&Credential::new("access_key_id", "secret_access_key"))?;
//! let (req, _artifacts) = signed.into_parts();
//! assert_eq!(req.uri().to_string(), "https://my-bucket.s3.amazonaws.com/");
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: SHA-256 and HMAC-SHA-256 helpers
//! - [`time`]: time formatting and parsing
//! - [`encoding`]: AWS flavoured percent-encoding
//! - [`collator`]: locale independent string ordering
//! - [`utils`]: redaction of secrets in `Debug` output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod collator;
pub mod encoding;
pub mod hash;
pub mod time;
pub mod utils;

mod constants;
pub use constants::{DEFAULT_PROFILE, DEFAULT_REGION};
mod error;
pub use error::{Error, ErrorKind, Result};
mod context;
pub use context::{Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend, OsEnv, StaticEnv};
mod credential;
pub use credential::Credential;
mod endpoint;
pub use endpoint::{Endpoint, Scheme};
mod canonical;
pub use canonical::{canonical_header_value, canonical_path, canonical_query_string, RequestState};
mod sign;
pub use sign::{authorization, generate_signing_key, signature, string_to_sign, Scope, ALGORITHM};
mod request;
pub use request::{RequestBuilder, SignedRequest, SigningArtifacts, UserAgent, DEFAULT_USER_AGENT};
mod response;
pub use response::{charset, ParseErrorResponse, Response, ServiceError, StatusOnlyErrorParser};
mod config;
pub use config::Config;
mod command;
pub use command::{Commands, ResolveEndpoint, RestCommand};
