//! Proxied page fetching with a bounded number of requests in flight.

mod client;
mod limiter;
mod retry;

pub use client::{FetchBatch, FetchOutcome, Fetcher, Page};
pub use limiter::RateLimiter;
pub use retry::RetryPolicy;

use thiserror::Error;

/// Terminal, per-URL fetch failure. Other URLs in the same batch are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("gave up on {url} after {attempts} attempts: {reason}")]
    Exhausted {
        url: String,
        attempts: usize,
        reason: String,
    },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Exhausted { url, .. } | Self::Transport { url, .. } => {
                url
            }
        }
    }
}
