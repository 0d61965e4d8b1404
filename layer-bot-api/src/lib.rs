//! # layer-bot-api
//!
//! Async client core for the Telegram Bot API.
//!
//! ## Features
//! - Typed request builder with the Bot API's omit-if-zero conventions
//! - URL-encoded bodies for plain calls, multipart for uploads
//! - Uploads streamed straight from any `AsyncRead`, never buffered whole
//! - Envelope decoding into caller-chosen result types
//! - Cancellation of any in-flight call, uploads included
//! - Opt-in flood-control retry with configurable policy
//! - Pluggable [`Transport`] for custom servers and tests
//!
//! ## Quick start
//! ```rust,no_run
//! use layer_bot_api::{Client, TextMessage, types::Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(std::env::var("BOT_TOKEN")?);
//!
//!     let me = client.get_me().await?;
//!     println!("running as @{}", me.username.unwrap_or_default());
//!
//!     let sent: Message = client.send(TextMessage::new("@my_channel", "Hello!")).await?;
//!     println!("sent message {}", sent.message_id);
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

mod errors;
mod peer;
mod request;
mod response;
mod retry;
pub mod encoder;
pub mod input_file;
pub mod methods;
pub mod outgoing;
pub mod transport;
pub mod types;

pub use encoder::{Encoder, MultipartEncoder, UrlEncodedEncoder};
pub use errors::{ApiError, EncodeError, InvocationError, TransportError};
pub use input_file::{InputFile, Media};
pub use methods::{KickOptions, ProfilePhotosOptions, RestrictOptions};
pub use outgoing::{DocumentMessage, OutgoingMessage, PhotoMessage, TextMessage};
pub use peer::Peer;
pub use request::{Request, RequestPart};
pub use response::{Response, ResponseParameters};
pub use retry::{AutoSleep, NoRetries, RetryContext, RetryPolicy};
pub use transport::{Download, HttpTransport, Transport, TransportConfig};
pub use types::ParseMode;

use std::fmt;
use std::num::NonZeroU32;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

// ─── Config ───────────────────────────────────────────────────────────────────

/// Configuration for [`Client::with_config`].
#[derive(Clone)]
pub struct Config {
    /// Where calls go (default: [`HttpTransport`] against `api.telegram.org`).
    pub transport: Arc<dyn Transport>,
    /// Cancelling this token aborts every in-flight call of the client.
    pub cancel:    CancellationToken,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: Arc::new(HttpTransport::default()),
            cancel:    CancellationToken::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

struct ClientInner {
    token:     String,
    transport: Arc<dyn Transport>,
}

/// The Bot API client. Cheap to clone: clones share the token and transport.
#[derive(Clone)]
pub struct Client {
    inner:  Arc<ClientInner>,
    cancel: CancellationToken,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The token is a credential.
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Client for `token` with the default HTTP transport.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_config(token, Config::default())
    }

    pub fn with_config(token: impl Into<String>, config: Config) -> Self {
        Self {
            inner:  Arc::new(ClientInner {
                token:     token.into(),
                transport: config.transport,
            }),
            cancel: config.cancel,
        }
    }

    /// A clone whose calls are bound to `cancel` instead.
    ///
    /// ```rust
    /// # use layer_bot_api::Client;
    /// # use tokio_util::sync::CancellationToken;
    /// let client = Client::new("1234:secret");
    /// let stop   = CancellationToken::new();
    /// let scoped = client.with_cancellation(stop.child_token());
    /// stop.cancel();
    /// assert!(scoped.cancellation_token().is_cancelled());
    /// ```
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self { inner: Arc::clone(&self.inner), cancel }
    }

    /// Token every call of this client is raced against.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    // ── Dispatch ───────────────────────────────────────────────────────────

    /// Execute `request` and decode its result into `T`.
    ///
    /// Transport failures come back as [`InvocationError::Transport`], an
    /// `ok: false` envelope as [`InvocationError::Api`] and a result that does
    /// not fit `T` as [`InvocationError::Decode`]. Nothing is retried.
    pub async fn invoke<T: DeserializeOwned>(&self, request: Request) -> Result<T, InvocationError> {
        let response = self.dispatch(request).await?;
        response.decode_result().map_err(InvocationError::Decode)
    }

    /// Execute `request` for its side effect; the result is not decoded.
    pub async fn call(&self, request: Request) -> Result<(), InvocationError> {
        self.dispatch(request).await.map(drop)
    }

    /// Build the request for `message` and invoke it.
    pub async fn send<T: DeserializeOwned>(
        &self,
        message: impl OutgoingMessage,
    ) -> Result<T, InvocationError> {
        self.invoke(message.into_request()).await
    }

    /// Open the file at server-side `path`, as returned by `getFile`.
    pub async fn download_file(&self, path: &str) -> Result<Download, InvocationError> {
        self.inner.transport
            .download(&self.cancel, &self.inner.token, path)
            .await
            .map_err(Into::into)
    }

    /// Like [`Client::invoke`], but consults `policy` after each failure.
    ///
    /// `build` is called once per attempt: a request is consumed when sent.
    /// Sleeping between attempts is cut short by cancellation.
    pub async fn invoke_with_retry<T: DeserializeOwned>(
        &self,
        policy:    &dyn RetryPolicy,
        mut build: impl FnMut() -> Request,
    ) -> Result<T, InvocationError> {
        let mut fail_count   = NonZeroU32::MIN;
        let mut slept_so_far = Duration::default();
        loop {
            match self.invoke(build()).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let ctx = RetryContext { fail_count, slept_so_far, error: e };
                    match policy.should_retry(&ctx) {
                        ControlFlow::Continue(delay) => {
                            tokio::select! {
                                biased;
                                _ = self.cancel.cancelled() => return Err(TransportError::Cancelled.into()),
                                _ = sleep(delay) => {}
                            }
                            slept_so_far += delay;
                            fail_count = fail_count.saturating_add(1);
                        }
                        ControlFlow::Break(()) => return Err(ctx.error),
                    }
                }
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response, InvocationError> {
        let request  = request.with_token(self.inner.token.as_str());
        let response = self.inner.transport.execute(&self.cancel, request).await?;
        if !response.ok {
            tracing::debug!(
                "[layer-bot-api] {}: API error {} ({})",
                response.method, response.error_code, response.description
            );
            return Err(ApiError::from_response(&response).into());
        }
        Ok(response)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
