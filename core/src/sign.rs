//! SigV4 key derivation and signature.

use std::fmt;
use std::fmt::Write;

use log::debug;

use crate::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use crate::time::{format_date, format_iso8601, DateTime};
use crate::Result;

/// Signing algorithm name, the first line of every string to sign.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Credential scope: `20150830/us-east-1/service/aws4_request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    time: DateTime,
    region: String,
    service: String,
}

impl Scope {
    /// Create a scope for the given time, region and service.
    pub fn new(time: DateTime, region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            time,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Signing time.
    pub fn time(&self) -> DateTime {
        self.time
    }

    /// Region of the scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service of the scope.
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/aws4_request",
            format_date(self.time),
            self.region,
            self.service
        )
    }
}

/// Build the string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20150830T123600Z
/// 20150830/us-east-1/service/aws4_request
/// <hex sha256 of canonical request>
/// ```
pub fn string_to_sign(canonical_request: &str, scope: &Scope) -> Result<String> {
    debug!("calculated scope: {scope}");

    let mut f = String::new();
    writeln!(f, "{ALGORITHM}")?;
    writeln!(f, "{}", format_iso8601(scope.time))?;
    writeln!(f, "{scope}")?;
    write!(f, "{}", hex_sha256(canonical_request.as_bytes()))?;
    Ok(f)
}

/// Derive the signing key for a scope.
///
/// The key is derived again for every request and never cached.
pub fn generate_signing_key(secret: &str, scope: &Scope) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(scope.time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), scope.region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), scope.service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}

/// Hex signature of a string to sign.
pub fn signature(secret: &str, scope: &Scope, string_to_sign: &str) -> String {
    let signing_key = generate_signing_key(secret, scope);
    hex_hmac_sha256(&signing_key, string_to_sign.as_bytes())
}

/// Value of the `Authorization` header.
pub fn authorization(
    access_key_id: &str,
    scope: &Scope,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{ALGORITHM} Credential={access_key_id}/{scope}, SignedHeaders={signed_headers}, Signature={signature}"
    )
}
