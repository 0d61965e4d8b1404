//! Error types for layer-bot-api.
//!
//! Three layers, from the wire up:
//! * [`EncodeError`]: an encoder could not write a field.
//! * [`TransportError`]: the call never produced a decodable envelope.
//! * [`ApiError`]: the envelope decoded fine but said `ok: false`.
//!
//! [`InvocationError`] is what every [`crate::Client`] method returns and keeps
//! the three apart.

use std::{fmt, io, time::Duration};

use crate::response::{Response, ResponseParameters};

// ─── EncodeError ──────────────────────────────────────────────────────────────

/// Failure while writing a request body.
#[derive(Debug)]
pub enum EncodeError {
    /// Writing to the underlying sink (or reading an attachment) failed.
    Io(io::Error),
    /// The encoder cannot carry this kind of field.
    Unsupported {
        /// Wire format that refused the field.
        encoder: &'static str,
        /// Name of the refused field.
        field:   String,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Unsupported { encoder, field } => {
                write!(f, "{encoder} encoder does not support file uploading (field '{field}')")
            }
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Unsupported { .. } => None,
        }
    }
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self { Self::Io(e) }
}

// ─── TransportError ───────────────────────────────────────────────────────────

/// The request did not make it to a decoded [`Response`].
#[derive(Debug)]
pub enum TransportError {
    /// Connection, TLS or body-read failure reported by the HTTP client.
    Http(reqwest::Error),
    /// Local I/O failure outside the HTTP client.
    Io(io::Error),
    /// The request body could not be encoded.
    Encode(EncodeError),
    /// The response body is not a Bot API envelope.
    Decode(serde_json::Error),
    /// A download answered with a non-success HTTP status.
    Status(u16),
    /// The call was cancelled before a response arrived.
    Cancelled,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e)      => write!(f, "execute http request: {e}"),
            Self::Io(e)        => write!(f, "I/O error: {e}"),
            Self::Encode(e)    => write!(f, "encode: {e}"),
            Self::Decode(e)    => write!(f, "unmarshal response: {e}"),
            Self::Status(code) => write!(f, "unexpected HTTP status {code}"),
            Self::Cancelled    => write!(f, "request cancelled"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e)   => Some(e),
            Self::Io(e)     => Some(e),
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
            _               => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self { Self::Http(e) }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self { Self::Io(e) }
}

impl From<EncodeError> for TransportError {
    fn from(e: EncodeError) -> Self { Self::Encode(e) }
}

// ─── ApiError ─────────────────────────────────────────────────────────────────

/// The Bot API answered with `ok: false`.
///
/// # Example
/// `{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 5","parameters":{"retry_after":5}}`
/// → `ApiError { code: 429, retry_after() == Some(5s), .. }`
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    /// `error_code` from the envelope.
    pub code:        i32,
    /// HTTP status of the reply.
    pub status:      u16,
    /// Human-readable `description` from the envelope.
    pub description: String,
    /// Structured hints sent with some failures.
    pub parameters:  Option<ResponseParameters>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code != 0 {
            write!(f, "API {}: {}", self.code, self.description)
        } else {
            f.write_str(&self.description)
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Build from a failed envelope.
    pub fn from_response(response: &Response) -> Self {
        Self {
            code:        response.error_code,
            status:      response.status_code,
            description: response.description.clone(),
            parameters:  response.parameters.clone(),
        }
    }

    /// Case-insensitive substring match on the description.
    ///
    /// `err.is("chat not found")` matches `"Bad Request: chat not found"`.
    pub fn is(&self, pattern: &str) -> bool {
        self.description.to_lowercase().contains(&pattern.to_lowercase())
    }

    /// How long flood control asks us to wait, if it does.
    pub fn retry_after(&self) -> Option<Duration> {
        self.parameters.as_ref().and_then(|p| p.retry_after)
    }

    /// The supergroup a migrated group moved to.
    pub fn migrate_to_chat_id(&self) -> Option<i64> {
        self.parameters.as_ref().and_then(|p| p.migrate_to_chat_id)
    }
}

// ─── InvocationError ──────────────────────────────────────────────────────────

/// The error type returned from any `Client` method that talks to the Bot API.
#[derive(Debug)]
pub enum InvocationError {
    /// No envelope was obtained.
    Transport(TransportError),
    /// The envelope said `ok: false`.
    Api(ApiError),
    /// The envelope said `ok: true` but `result` did not fit the requested type.
    Decode(serde_json::Error),
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{e}"),
            Self::Api(e)       => write!(f, "{e}"),
            Self::Decode(e)    => write!(f, "unmarshal result: {e}"),
        }
    }
}

impl std::error::Error for InvocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Api(e)       => Some(e),
            Self::Decode(e)    => Some(e),
        }
    }
}

impl From<TransportError> for InvocationError {
    fn from(e: TransportError) -> Self { Self::Transport(e) }
}

impl From<ApiError> for InvocationError {
    fn from(e: ApiError) -> Self { Self::Api(e) }
}

impl InvocationError {
    /// Returns `true` if this is an API error whose description contains `pattern`.
    pub fn is(&self, pattern: &str) -> bool {
        match self {
            Self::Api(e) => e.is(pattern),
            _            => false,
        }
    }

    /// If this is a flood-control error, how long to wait.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api(e) => e.retry_after(),
            _            => None,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
