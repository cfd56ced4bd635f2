use awsnano_core::{Error, ParseErrorResponse, Response, Result, ServiceError};
use log::debug;
use quick_xml::de;
use serde::Deserialize;

/// Parses the `<Error>` document S3 sends with a failed response.
///
/// Responses without a body, such as the ones to `HEAD`, carry only their
/// status. The signature debugging fields S3 adds to `SignatureDoesNotMatch`
/// are kept in [`ServiceError::details`].
#[derive(Debug, Clone, Copy, Default)]
pub struct S3ErrorParser;

impl ParseErrorResponse for S3ErrorParser {
    fn parse_error_response(&self, resp: &Response) -> Result<ServiceError> {
        let mut se = ServiceError::new(resp.status());
        if resp.body().trim().is_empty() {
            return Ok(se);
        }

        let body: ErrorBody = de::from_str(resp.body()).map_err(|e| {
            Error::response_invalid(format!(
                "failed to parse error response of {}",
                resp.url()
            ))
            .with_source(e)
        })?;
        debug!("s3 error response: {:?}", body.code);

        se.code = body.code;
        se.message = body.message;
        se.resource = body.resource;
        se.request_id = body
            .request_id
            .or_else(|| resp.header("x-amz-request-id").map(str::to_string));

        let details = [
            ("HostId", body.host_id),
            ("AWSAccessKeyId", body.aws_access_key_id),
            ("StringToSign", body.string_to_sign),
            ("StringToSignBytes", body.string_to_sign_bytes),
            ("CanonicalRequest", body.canonical_request),
            ("CanonicalRequestBytes", body.canonical_request_bytes),
            ("SignatureProvided", body.signature_provided),
        ];
        for (name, value) in details {
            if let Some(value) = value {
                se.details.insert(name.to_string(), value);
            }
        }
        Ok(se)
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    resource: Option<String>,
    request_id: Option<String>,
    host_id: Option<String>,
    #[serde(rename = "AWSAccessKeyId")]
    aws_access_key_id: Option<String>,
    string_to_sign: Option<String>,
    string_to_sign_bytes: Option<String>,
    canonical_request: Option<String>,
    canonical_request_bytes: Option<String>,
    signature_provided: Option<String>,
}
