//! Caller-side retry policies for flood control and transient network errors.
//!
//! [`crate::Client::invoke`] never retries. These policies are only consulted
//! by [`crate::Client::invoke_with_retry`].

use std::num::NonZeroU32;
use std::ops::ControlFlow;
use std::time::Duration;

use crate::errors::{InvocationError, TransportError};

/// Decides whether a failed call is attempted again, and after how long.
pub trait RetryPolicy: Send + Sync + 'static {
    fn should_retry(&self, ctx: &RetryContext) -> ControlFlow<(), Duration>;
}

/// Context passed to [`RetryPolicy::should_retry`] on each failure.
#[derive(Debug)]
pub struct RetryContext {
    pub fail_count:   NonZeroU32,
    pub slept_so_far: Duration,
    pub error:        InvocationError,
}

/// Never retry.
pub struct NoRetries;

impl RetryPolicy for NoRetries {
    fn should_retry(&self, _: &RetryContext) -> ControlFlow<(), Duration> {
        ControlFlow::Break(())
    }
}

/// Sleep through `retry_after` once, and retry once on network errors.
pub struct AutoSleep {
    /// Longest flood wait that is slept through instead of returned.
    pub threshold:             Duration,
    /// Delay before retrying a failed connection, `None` to give up at once.
    pub io_errors_as_flood_of: Option<Duration>,
}

impl Default for AutoSleep {
    fn default() -> Self {
        Self {
            threshold:             Duration::from_secs(60),
            io_errors_as_flood_of: Some(Duration::from_secs(1)),
        }
    }
}

impl RetryPolicy for AutoSleep {
    fn should_retry(&self, ctx: &RetryContext) -> ControlFlow<(), Duration> {
        if let Some(wait) = ctx.error.retry_after() {
            if ctx.fail_count.get() == 1 && wait <= self.threshold {
                tracing::info!("[layer-bot-api] flood control: sleeping {wait:?} before retry");
                return ControlFlow::Continue(wait);
            }
        }
        let network = matches!(
            ctx.error,
            InvocationError::Transport(TransportError::Http(_) | TransportError::Io(_))
        );
        if network && ctx.fail_count.get() == 1 {
            if let Some(d) = self.io_errors_as_flood_of {
                tracing::info!("[layer-bot-api] network error: sleeping {d:?} before retry");
                return ControlFlow::Continue(d);
            }
        }
        ControlFlow::Break(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
