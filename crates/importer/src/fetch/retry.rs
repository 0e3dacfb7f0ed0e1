use std::time::Duration;

/// When to give a request another go, and how long to wait first.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: usize,
    /// Fixed pause between attempts.
    pub wait: Duration,
    pub retry_statuses: Vec<u16>,
    /// Lower-case phrases that mark an anti-bot page.
    pub block_markers: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            wait: Duration::from_secs(5),
            retry_statuses: vec![500, 502, 503, 504],
            block_markers: vec!["you are blocked".to_string()],
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    #[must_use]
    pub fn with_block_marker(mut self, marker: impl Into<String>) -> Self {
        self.block_markers.push(marker.into().to_lowercase());
        self
    }

    /// Connection and timeout failures are worth retrying; anything else is final.
    pub fn is_transient(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }

    /// Why a completed response should be retried, if it should.
    pub fn retry_reason(&self, status: u16, body: &str) -> Option<String> {
        if self.retry_statuses.contains(&status) {
            return Some(format!("HTTP {status}"));
        }

        let lowered = body.to_lowercase();
        self.block_markers
            .iter()
            .find(|marker| lowered.contains(marker.as_str()))
            .map(|marker| format!("block page ('{marker}')"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_retried() {
        let policy = RetryPolicy::default();
        for status in [500, 502, 503, 504] {
            assert!(policy.retry_reason(status, "").is_some(), "{status}");
        }
        for status in [200, 301, 404, 429, 501] {
            assert!(policy.retry_reason(status, "<html></html>").is_none(), "{status}");
        }
    }

    #[test]
    fn test_block_marker_is_case_insensitive() {
        let policy = RetryPolicy::default();
        let reason = policy.retry_reason(200, "<h1>Sorry, You Are Blocked</h1>");
        assert_eq!(reason.as_deref(), Some("block page ('you are blocked')"));
    }

    #[test]
    fn test_builder() {
        let policy = RetryPolicy::new()
            .with_max_attempts(0)
            .with_wait(Duration::from_millis(1))
            .with_block_marker("Captcha");
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.wait, Duration::from_millis(1));
        assert!(policy.retry_reason(200, "solve the CAPTCHA").is_some());
    }
}
