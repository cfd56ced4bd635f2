use std::fmt::Debug;
use std::sync::Arc;

use http::Method;
use log::{debug, log_enabled, Level};

use crate::request::RequestBuilder;
use crate::response::{ParseErrorResponse, Response};
use crate::{Config, Context, Endpoint, Error, ErrorKind, Result};

/// Maps a region to the endpoint of one service.
pub trait ResolveEndpoint: Debug + Send + Sync + 'static {
    /// Name of the service, as used in the credential scope.
    fn service_name(&self) -> &str;

    /// The endpoint for a region, `None` if the service is not offered there.
    fn endpoint(&self, region: &str) -> Option<Endpoint>;
}

/// One REST operation of a service.
///
/// A command describes its request and parses its successful response.
/// Everything else, from signing to error handling, is done by [`Commands`].
pub trait RestCommand: Send + Sync {
    /// What a successful response is parsed into.
    type Output;

    /// Name of the service, as used in the credential scope.
    fn service_name(&self) -> &str;

    /// Http method, `GET` by default.
    fn method(&self) -> Method {
        Method::GET
    }

    /// Host to send to instead of the endpoint host.
    fn host(&self, _endpoint: &Endpoint) -> Result<Option<String>> {
        Ok(None)
    }

    /// Url path.
    fn path(&self, endpoint: &Endpoint) -> Result<String>;

    /// Add the command specific headers.
    fn add_headers(&self, _builder: &mut RequestBuilder) -> Result<()> {
        Ok(())
    }

    /// Add the command specific query parameters.
    fn add_query_parameters(&self, _builder: &mut RequestBuilder) -> Result<()> {
        Ok(())
    }

    /// Request body, if the command sends one.
    fn create_body(&self, _endpoint: &Endpoint) -> Result<Option<String>> {
        Ok(None)
    }

    /// Parse a successful response.
    fn parse_response(&self, resp: &Response) -> Result<Self::Output>;
}

/// Commands executes [`RestCommand`]s of one service.
#[derive(Clone, Debug)]
pub struct Commands {
    ctx: Context,
    config: Config,
    resolver: Arc<dyn ResolveEndpoint>,
    errors: Arc<dyn ParseErrorResponse>,
}

impl Commands {
    /// Create a new executor.
    pub fn new(
        ctx: Context,
        config: Config,
        resolver: impl ResolveEndpoint,
        errors: impl ParseErrorResponse,
    ) -> Self {
        Self {
            ctx,
            config,
            resolver: Arc::new(resolver),
            errors: Arc::new(errors),
        }
    }

    /// The config commands are executed with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The endpoint commands are sent to.
    pub fn endpoint(&self) -> Result<Endpoint> {
        self.config.endpoint(self.resolver.as_ref())
    }

    /// Create the unsigned request a command describes.
    pub fn request_builder<C: RestCommand>(&self, cmd: &C) -> Result<RequestBuilder> {
        let endpoint = self.endpoint()?;

        let mut builder = RequestBuilder::new(cmd.service_name(), endpoint.clone())
            .with_method(cmd.method())
            .with_path(cmd.path(&endpoint)?)
            .with_user_agent(self.config.user_agent.clone());
        if let Some(host) = cmd.host(&endpoint)? {
            builder = builder.with_host(host);
        }
        if let Some(body) = cmd.create_body(&endpoint)? {
            builder = builder.with_body(body);
        }
        cmd.add_headers(&mut builder)?;
        cmd.add_query_parameters(&mut builder)?;
        Ok(builder)
    }

    /// Sign and send a command, then parse its response.
    pub async fn execute<C: RestCommand>(&self, cmd: &C) -> Result<C::Output> {
        let cred = self.config.credential().ok_or_else(|| {
            Error::credential_invalid("no credential found in env or profile files")
        })?;

        let signed = self.request_builder(cmd)?.finalize(&cred)?;
        let (req, artifacts) = signed.into_parts();
        let url = req.uri().to_string();
        debug!("sending {} {url}", req.method());

        let resp = self.ctx.http_send(req).await?;
        let resp = Response::new(url, resp)?;

        if resp.is_success() {
            return cmd.parse_response(&resp).map_err(|err| {
                if err.kind() == ErrorKind::ResponseInvalid {
                    err
                } else {
                    Error::response_invalid(format!("failed to parse response of {}", resp.url()))
                        .with_source(err)
                }
            });
        }

        let service_error = self.errors.parse_error_response(&resp)?;
        let err = Error::service(resp.url(), service_error);
        if log_enabled!(Level::Debug) {
            debug!(
                "request to {} failed with {}\ncanonical request:\n{}\nstring to sign:\n{}\nresponse headers: {:?}",
                resp.url(),
                resp.status(),
                artifacts.canonical_request,
                artifacts.string_to_sign,
                resp.headers()
            );
            return Err(err.with_artifacts(artifacts));
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HttpSend;
    use crate::endpoint::Scheme;
    use crate::response::{ServiceError, StatusOnlyErrorParser};
    use bytes::Bytes;
    use http::StatusCode;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Resolver;

    impl ResolveEndpoint for Resolver {
        fn service_name(&self) -> &str {
            "service"
        }

        fn endpoint(&self, region: &str) -> Option<Endpoint> {
            Endpoint::new(region, vec![Scheme::Https], "example.com", true, true).ok()
        }
    }

    #[derive(Debug, Clone)]
    struct MockHttpSend {
        status: StatusCode,
        body: &'static str,
        sent: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    }

    impl MockHttpSend {
        fn new(status: StatusCode, body: &'static str) -> Self {
            Self {
                status,
                body,
                sent: Arc::default(),
            }
        }
    }

    #[async_trait::async_trait]
    impl HttpSend for MockHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            self.sent.lock().unwrap().push(req);
            Ok(http::Response::builder()
                .status(self.status)
                .body(Bytes::from_static(self.body.as_bytes()))
                .unwrap())
        }
    }

    struct Echo;

    impl RestCommand for Echo {
        type Output = String;

        fn service_name(&self) -> &str {
            "service"
        }

        fn method(&self) -> Method {
            Method::PUT
        }

        fn path(&self, _: &Endpoint) -> Result<String> {
            Ok("/echo".to_string())
        }

        fn add_headers(&self, builder: &mut RequestBuilder) -> Result<()> {
            builder.add_header("x-amz-meta-kind", "echo", true);
            Ok(())
        }

        fn add_query_parameters(&self, builder: &mut RequestBuilder) -> Result<()> {
            builder.add_query_parameter("mode", "loud");
            Ok(())
        }

        fn create_body(&self, _: &Endpoint) -> Result<Option<String>> {
            Ok(Some("ping".to_string()))
        }

        fn parse_response(&self, resp: &Response) -> Result<String> {
            if resp.body().is_empty() {
                return Err(Error::unexpected("empty body"));
            }
            Ok(resp.body().to_uppercase())
        }
    }

    #[derive(Debug)]
    struct CodeParser;

    impl ParseErrorResponse for CodeParser {
        fn parse_error_response(&self, resp: &Response) -> Result<ServiceError> {
            let mut se = ServiceError::new(resp.status());
            se.code = Some(resp.body().to_string());
            Ok(se)
        }
    }

    fn config() -> Config {
        Config {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_builder() {
        let commands = Commands::new(Context::new(), config(), Resolver, StatusOnlyErrorParser);
        let builder = commands.request_builder(&Echo).unwrap();

        let state = builder.state();
        assert_eq!(state.header("x-amz-meta-kind"), Some(&["echo".to_string()][..]));
        assert_eq!(builder.endpoint().host(), "example.com");
    }

    #[tokio::test]
    async fn test_execute_success() {
        let http = MockHttpSend::new(StatusCode::OK, "pong");
        let ctx = Context::new().with_http_send(http.clone());
        let commands = Commands::new(ctx, config(), Resolver, StatusOnlyErrorParser);

        assert_eq!(commands.execute(&Echo).await.unwrap(), "PONG");

        let sent = http.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method(), &Method::PUT);
        assert_eq!(sent[0].uri().to_string(), "https://example.com/echo?mode=loud");
        assert_eq!(sent[0].body().as_ref(), b"ping");
        assert!(sent[0].headers().contains_key("x-amz-content-sha256"));
    }

    #[tokio::test]
    async fn test_execute_service_error() {
        let http = MockHttpSend::new(StatusCode::FORBIDDEN, "AccessDenied");
        let ctx = Context::new().with_http_send(http);
        let commands = Commands::new(ctx, config(), Resolver, CodeParser);

        let err = commands.execute(&Echo).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceError);
        let se = err.service_error().unwrap();
        assert_eq!(se.status, StatusCode::FORBIDDEN);
        assert_eq!(se.code.as_deref(), Some("AccessDenied"));
        assert!(err.to_string().contains("https://example.com/echo?mode=loud"));
    }

    #[tokio::test]
    async fn test_execute_unparsable_response() {
        let http = MockHttpSend::new(StatusCode::OK, "");
        let ctx = Context::new().with_http_send(http);
        let commands = Commands::new(ctx, config(), Resolver, StatusOnlyErrorParser);

        let err = commands.execute(&Echo).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseInvalid);
    }

    #[tokio::test]
    async fn test_execute_without_credential() {
        let http = MockHttpSend::new(StatusCode::OK, "pong");
        let ctx = Context::new().with_http_send(http.clone());
        let commands = Commands::new(ctx, Config::default(), Resolver, StatusOnlyErrorParser);

        let err = commands.execute(&Echo).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(http.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_transport_error() {
        let commands = Commands::new(Context::new(), config(), Resolver, StatusOnlyErrorParser);
        let err = commands.execute(&Echo).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }
}
