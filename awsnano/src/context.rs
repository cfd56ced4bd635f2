use awsnano_core::{Context, OsEnv};
use awsnano_file_read_tokio::TokioFileRead;
use awsnano_http_send_reqwest::ReqwestHttpSend;

/// A [`Context`] reading files with tokio, sending with reqwest and reading
/// the process environment.
pub fn default_context() -> Context {
    Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}
