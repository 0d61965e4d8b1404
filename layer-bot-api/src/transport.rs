//! Getting a [`Request`] to the server and a [`Response`] back.
//!
//! [`HttpTransport`] picks the body format from the request itself:
//!
//! | Attachments | Encoder | Path |
//! |-------------|---------|------|
//! | none | [`UrlEncodedEncoder`] | buffered: encode to memory, one POST |
//! | any  | [`MultipartEncoder`]  | streaming: encode into a pipe while the POST reads it |
//!
//! In the streaming path an upload task writes the multipart body into an
//! in-memory pipe while the HTTP client sends the other end. Whichever of
//! {response, encode error, cancellation} comes first decides the outcome, and
//! the other side is torn down.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;
use tokio_util::io::{ReaderStream, StreamReader};
use tokio_util::sync::CancellationToken;

use crate::encoder::{Encoder, MultipartEncoder, UrlEncodedEncoder};
use crate::errors::TransportError;
use crate::request::Request;
use crate::response::Response;

/// Default Bot API server.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Default size of the in-memory pipe used for streaming uploads (64 KB).
pub const DEFAULT_PIPE_CAPACITY: usize = 64 * 1024;

// ─── Transport ────────────────────────────────────────────────────────────────

/// Executes requests and downloads files.
///
/// Implement this to route calls somewhere other than HTTP, e.g. a canned
/// responder in tests.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send `request` and decode the reply envelope.
    async fn execute(
        &self,
        cancel:  &CancellationToken,
        request: Request,
    ) -> Result<Response, TransportError>;

    /// Open the file at server-side `path`. The body is returned unread.
    async fn download(
        &self,
        cancel: &CancellationToken,
        token:  &str,
        path:   &str,
    ) -> Result<Download, TransportError>;
}

// ─── Download ─────────────────────────────────────────────────────────────────

/// Body of a downloaded file. Owned by the caller; dropping it releases the
/// connection.
pub struct Download {
    inner: Pin<Box<dyn AsyncRead + Send>>,
}

impl Download {
    pub fn new(inner: impl AsyncRead + Send + 'static) -> Self {
        Self { inner: Box::pin(inner) }
    }
}

impl AsyncRead for Download {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx:       &mut Context<'_>,
        buf:      &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Download { .. }")
    }
}

// ─── TransportConfig ──────────────────────────────────────────────────────────

/// Builds a URL from a bot token and a method name or file path.
pub type UrlBuilder = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Configuration for [`HttpTransport::new`].
#[derive(Clone)]
pub struct TransportConfig {
    /// HTTP client used for every call.
    pub http:          reqwest::Client,
    /// `(token, method)` → call URL.
    pub call_url:      UrlBuilder,
    /// `(token, path)` → download URL.
    pub file_url:      UrlBuilder,
    /// Buffer size of the streaming upload pipe.
    pub pipe_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }
}

impl TransportConfig {
    /// Point both URL builders at another Bot API compatible server.
    ///
    /// `base` is everything before `/bot<token>`, e.g. `http://127.0.0.1:8081`.
    pub fn with_api_base(base: impl Into<String>) -> Self {
        let base: Arc<str> = base.into().trim_end_matches('/').into();
        let files = Arc::clone(&base);
        Self {
            http:          reqwest::Client::new(),
            call_url:      Arc::new(move |token, method| format!("{base}/bot{token}/{method}")),
            file_url:      Arc::new(move |token, path| format!("{files}/file/bot{token}/{path}")),
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
        }
    }

    /// Replace the call URL builder.
    pub fn call_url(mut self, f: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        self.call_url = Arc::new(f); self
    }

    /// Replace the download URL builder.
    pub fn file_url(mut self, f: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        self.file_url = Arc::new(f); self
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS).
    pub fn http(mut self, client: reqwest::Client) -> Self {
        self.http = client; self
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("pipe_capacity", &self.pipe_capacity)
            .finish_non_exhaustive()
    }
}

// ─── HttpTransport ────────────────────────────────────────────────────────────

/// The default transport: url-encoded bodies for plain calls, streamed
/// multipart bodies for uploads.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// URL a call to `method` is posted to.
    pub fn call_url(&self, token: &str, method: &str) -> String {
        (self.config.call_url)(token, method)
    }

    /// URL the file at `path` is fetched from.
    pub fn file_url(&self, token: &str, path: &str) -> String {
        (self.config.file_url)(token, path)
    }

    /// Buffered path: the whole body is encoded before the call starts.
    async fn execute_simple(
        &self,
        cancel:  &CancellationToken,
        request: Request,
    ) -> Result<Response, TransportError> {
        let url    = self.call_url(request.token(), request.method());
        let method = request.method().to_string();

        let mut encoder = UrlEncodedEncoder::new(Vec::new());
        request.encode(&mut encoder).await?;
        encoder.close().await?;
        let content_type = encoder.content_type();
        let body = encoder.into_inner();

        tracing::debug!("[layer-bot-api] {method}: urlencoded, {} bytes", body.len());

        tokio::select! {
            biased;
            _   = cancel.cancelled() => Err(TransportError::Cancelled),
            res = self.send(&method, url, content_type, reqwest::Body::from(body)) => res,
        }
    }

    /// Streaming path: the body is encoded concurrently with sending it.
    async fn execute_streaming(
        &self,
        cancel:  &CancellationToken,
        request: Request,
    ) -> Result<Response, TransportError> {
        let url    = self.call_url(request.token(), request.method());
        let method = request.method().to_string();

        // Both halves die with this call: the guard cancels the upload task
        // however the race below ends.
        let cancel = cancel.child_token();
        let _guard = cancel.clone().drop_guard();

        let (reader, writer) = tokio::io::duplex(self.config.pipe_capacity);
        let mut encoder = MultipartEncoder::new(writer);
        let content_type = encoder.content_type();

        let (err_tx, mut err_rx) = mpsc::channel::<TransportError>(1);

        tracing::debug!("[layer-bot-api] {method}: multipart, streaming");

        // upload
        let upload_cancel = cancel.clone();
        tokio::spawn(async move {
            let encoded = async {
                request.encode(&mut encoder).await?;
                encoder.close().await
            };
            let result = tokio::select! {
                _ = upload_cancel.cancelled() => return,
                r = encoded => r,
            };
            if let Err(e) = result {
                let _ = err_tx.send(TransportError::Encode(e)).await;
            }
        });

        // send
        let body = reqwest::Body::wrap_stream(ReaderStream::new(reader));
        let send = self.send(&method, url, content_type, body);

        tokio::select! {
            biased;
            _        = cancel.cancelled() => Err(TransportError::Cancelled),
            Some(e)  = err_rx.recv()      => Err(e),
            res      = send               => res,
        }
    }

    async fn send(
        &self,
        method:       &str,
        url:          String,
        content_type: String,
        body:         reqwest::Body,
    ) -> Result<Response, TransportError> {
        let res = self.config.http
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        let status  = res.status().as_u16();
        let content = res.bytes().await?;
        tracing::trace!("[layer-bot-api] {method}: HTTP {status}, {} bytes", content.len());

        let mut response = Response::from_slice(&content).map_err(TransportError::Decode)?;
        response.status_code = status;
        response.method = method.to_string();
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        cancel:  &CancellationToken,
        request: Request,
    ) -> Result<Response, TransportError> {
        if request.has_attachments() {
            self.execute_streaming(cancel, request).await
        } else {
            self.execute_simple(cancel, request).await
        }
    }

    async fn download(
        &self,
        cancel: &CancellationToken,
        token:  &str,
        path:   &str,
    ) -> Result<Download, TransportError> {
        let url = self.file_url(token, path);
        tracing::debug!("[layer-bot-api] download: {path}");

        let res = tokio::select! {
            biased;
            _   = cancel.cancelled() => return Err(TransportError::Cancelled),
            res = self.config.http.get(url).send() => res?,
        };

        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let stream = res.bytes_stream().map_err(std::io::Error::other);
        Ok(Download::new(StreamReader::new(stream)))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_builders() {
        let t = HttpTransport::default();
        assert_eq!(t.call_url("1234:secret", "getMe"), "https://api.telegram.org/bot1234:secret/getMe");
        assert_eq!(
            t.file_url("1234:secret", "photos/user.png"),
            "https://api.telegram.org/file/bot1234:secret/photos/user.png",
        );
    }

    #[test]
    fn custom_url_builders() {
        let t = HttpTransport::new(
            TransportConfig::default()
                .call_url(|token, method| format!("https://api.telegram.local/bot{token}/{method}"))
                .file_url(|token, path| format!("https://api.telegram.local/file/bot{token}/{path}")),
        );
        assert_eq!(t.call_url("test", "getMe"), "https://api.telegram.local/bottest/getMe");
        assert_eq!(t.file_url("test", "photo.png"), "https://api.telegram.local/file/bottest/photo.png");
    }

    #[test]
    fn api_base_trims_trailing_slash() {
        let t = HttpTransport::new(TransportConfig::with_api_base("http://127.0.0.1:8081/"));
        assert_eq!(t.call_url("t", "getMe"), "http://127.0.0.1:8081/bott/getMe");
        assert_eq!(t.file_url("t", "a/b.jpg"), "http://127.0.0.1:8081/file/bott/a/b.jpg");
    }

    #[tokio::test]
    async fn cancelled_before_start_never_sends() {
        let t = HttpTransport::new(TransportConfig::with_api_base("http://127.0.0.1:9"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = t.execute(&cancel, Request::new("getMe").with_token("t")).await.unwrap_err();
        assert!(matches!(err, TransportError::Cancelled));
    }
}
