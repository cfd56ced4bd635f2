use std::collections::HashMap;

use awsnano_core::{Endpoint, ResolveEndpoint, Scheme};

use crate::constants::{S3_REGIONS, S3_SERVICE_NAME, US_EAST_1};

/// Region to endpoint table of S3.
///
/// `us-east-1` is served by `s3.amazonaws.com`, every other region by
/// `s3-{region}.s3.amazonaws.com`. All endpoints prefer HTTPS, allow
/// virtual-host addressing and require `x-amz-content-sha256`.
#[derive(Debug, Clone)]
pub struct S3EndpointResolver {
    endpoints: HashMap<String, Endpoint>,
}

impl Default for S3EndpointResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl S3EndpointResolver {
    /// Create a resolver with the built-in regions.
    pub fn new() -> Self {
        let endpoints = S3_REGIONS
            .iter()
            .filter_map(|region| {
                let host = if *region == US_EAST_1 {
                    "s3.amazonaws.com".to_string()
                } else {
                    format!("s3-{region}.s3.amazonaws.com")
                };
                Endpoint::new(*region, vec![Scheme::Https, Scheme::Http], host, true, true)
                    .ok()
                    .map(|ep| (region.to_string(), ep))
            })
            .collect();

        Self { endpoints }
    }

    /// Add or replace the endpoint of a region.
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints
            .insert(endpoint.region().to_string(), endpoint);
        self
    }
}

impl ResolveEndpoint for S3EndpointResolver {
    fn service_name(&self) -> &str {
        S3_SERVICE_NAME
    }

    fn endpoint(&self, region: &str) -> Option<Endpoint> {
        self.endpoints.get(region).cloned()
    }
}
