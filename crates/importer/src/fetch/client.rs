use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::{FetchError, RateLimiter, RetryPolicy};
use crate::config::FetchConfig;
use crate::{ImporterError, Result};

/// A successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The target URL, not the proxy URL.
    pub url: String,
    pub status: u16,
    pub body: String,
}

pub type FetchOutcome = std::result::Result<Page, FetchError>;

/// Per-URL outcomes of [`Fetcher::fetch_all`], in request order.
#[derive(Debug, Default)]
pub struct FetchBatch {
    results: Vec<(String, FetchOutcome)>,
}

impl FetchBatch {
    pub fn results(&self) -> &[(String, FetchOutcome)] {
        &self.results
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.results.iter().filter_map(|(_, outcome)| outcome.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchError> {
        self.results.iter().filter_map(|(_, outcome)| outcome.as_ref().err())
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.results
            .into_iter()
            .filter_map(|(_, outcome)| outcome.ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

enum Attempt {
    Done(Page),
    Retry(String),
    Fail(FetchError),
}

/// Fetches pages through the scraping proxy, sharing one permit pool across clones.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    limiter: RateLimiter,
    policy: RetryPolicy,
    proxy_url: String,
    api_key: String,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("gp-importer/0.1")
            .build()?;

        Ok(Self {
            client,
            limiter: RateLimiter::new(config.concurrency),
            policy: config.retry.clone(),
            proxy_url: config.proxy_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Fetches one URL, retrying transient failures per the policy.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_reason = String::new();

        for attempt in 1..=max_attempts {
            match self.attempt(url).await {
                Attempt::Done(page) => return Ok(page),
                Attempt::Fail(err) => {
                    error!(url, error = %err, "fetch failed");
                    return Err(err);
                }
                Attempt::Retry(reason) => {
                    warn!(url, attempt, max_attempts, reason = %reason, "retryable fetch failure");
                    last_reason = reason;
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.policy.wait).await;
            }
        }

        let err = FetchError::Exhausted {
            url: url.to_string(),
            attempts: max_attempts,
            reason: last_reason,
        };
        error!(url, error = %err, "fetch failed after retries");
        Err(err)
    }

    async fn attempt(&self, url: &str) -> Attempt {
        // Held for this attempt only; dropped before any backoff sleep.
        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return Attempt::Fail(FetchError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let response = match self
            .client
            .get(&self.proxy_url)
            .query(&[("api_key", self.api_key.as_str()), ("url", url)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return self.transport_failure(url, e),
        };

        let status = response.status().as_u16();
        info!(method = "GET", url, status, "response");

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.transport_failure(url, e),
        };

        if let Some(reason) = self.policy.retry_reason(status, &body) {
            return Attempt::Retry(reason);
        }

        if status != 200 {
            return Attempt::Fail(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        Attempt::Done(Page {
            url: url.to_string(),
            status,
            body,
        })
    }

    fn transport_failure(&self, url: &str, e: reqwest::Error) -> Attempt {
        let transient = RetryPolicy::is_transient(&e);
        // reqwest errors embed the full request URL, which carries the proxy key.
        let reason = e.without_url().to_string();
        if transient {
            Attempt::Retry(reason)
        } else {
            Attempt::Fail(FetchError::Transport {
                url: url.to_string(),
                reason,
            })
        }
    }

    /// Fetches every URL concurrently, bounded by the permit pool.
    ///
    /// Per-URL failures come back as values. A fetch task that panics or is
    /// cancelled aborts its siblings and fails the whole batch.
    pub async fn fetch_all<I, S>(&self, urls: I) -> Result<FetchBatch>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tasks = JoinSet::new();
        for (idx, url) in urls.into_iter().enumerate() {
            let url: String = url.into();
            let fetcher = self.clone();
            tasks.spawn(async move {
                let outcome = fetcher.fetch(&url).await;
                (idx, url, outcome)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(e) => {
                    tasks.abort_all();
                    error!(error = %e, "fetch task died, cancelling batch");
                    return Err(ImporterError::TaskError(e));
                }
            }
        }

        results.sort_by_key(|(idx, _, _)| *idx);
        let batch = FetchBatch {
            results: results
                .into_iter()
                .map(|(_, url, outcome)| (url, outcome))
                .collect(),
        };

        info!(
            requested = batch.len(),
            fetched = batch.pages().count(),
            failed = batch.failures().count(),
            "fetch batch complete"
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing_subscriber::fmt::MakeWriter;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Collects formatted log lines from this crate for the current thread.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn install(&self) -> tracing::subscriber::DefaultGuard {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter("gp_importer=debug")
                .with_writer(self.clone())
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_default(subscriber)
        }

        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect()
        }

        fn count(&self, level: &str, message: &str) -> usize {
            self.lines()
                .iter()
                .filter(|line| line.contains(level) && line.contains(message))
                .count()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn config_for(server: &MockServer) -> FetchConfig {
        let mut config = FetchConfig::new("test-key");
        config.proxy_url = format!("{}/v1/", server.uri());
        config.timeout = Duration::from_secs(5);
        config.retry = RetryPolicy::default().with_wait(Duration::from_millis(10));
        config
    }

    fn proxied(target: &str) -> wiremock::MockBuilder {
        Mock::given(method("GET"))
            .and(path("/v1/"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("url", target))
    }

    #[tokio::test]
    async fn test_503_twice_then_200_succeeds() {
        let server = MockServer::start().await;
        let target = "https://site.test/riders/1";
        proxied(target)
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        proxied(target)
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let fetcher = Fetcher::new(&config_for(&server)).unwrap();
        let page = fetcher.fetch(target).await.unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.url, target);
        assert_eq!(page.body, "<html>ok</html>");

        assert_eq!(logs.count("WARN", "retryable fetch failure"), 2);
        assert_eq!(logs.count("ERROR", ""), 0, "{:?}", logs.lines());
    }

    #[tokio::test]
    async fn test_503_three_times_is_terminal() {
        let server = MockServer::start().await;
        let target = "https://site.test/riders/2";
        proxied(target)
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let fetcher = Fetcher::new(&config_for(&server)).unwrap();
        let err = fetcher.fetch(target).await.unwrap_err();

        assert_eq!(logs.count("ERROR", "fetch failed after retries"), 1);
        assert_eq!(
            err,
            FetchError::Exhausted {
                url: target.to_string(),
                attempts: 3,
                reason: "HTTP 503".to_string(),
            }
        );
        assert_eq!(fetcher.limiter().available(), 5);
    }

    #[tokio::test]
    async fn test_block_page_is_retried() {
        let server = MockServer::start().await;
        let target = "https://site.test/riders/3";
        proxied(target)
            .respond_with(ResponseTemplate::new(200).set_body_string("You are blocked"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        proxied(target)
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rider</html>"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&config_for(&server)).unwrap();
        let page = fetcher.fetch(target).await.unwrap();
        assert_eq!(page.body, "<html>rider</html>");
    }

    #[tokio::test]
    async fn test_404_is_not_retried() {
        let server = MockServer::start().await;
        let target = "https://site.test/riders/missing";
        proxied(target)
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&config_for(&server)).unwrap();
        let err = fetcher.fetch(target).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                url: target.to_string(),
                status: 404,
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_order_and_isolates_failures() {
        let server = MockServer::start().await;
        let urls: Vec<String> = (0..6).map(|i| format!("https://site.test/riders/{i}")).collect();
        for (i, url) in urls.iter().enumerate() {
            let template = if i == 4 {
                ResponseTemplate::new(503)
            } else {
                ResponseTemplate::new(200)
                    .set_body_string(format!("page {i}"))
                    .set_delay(Duration::from_millis(30 - 5 * i as u64))
            };
            proxied(url).respond_with(template).mount(&server).await;
        }

        let fetcher = Fetcher::new(&config_for(&server)).unwrap();
        let batch = fetcher.fetch_all(urls.clone()).await.unwrap();

        let returned: Vec<&str> = batch.results().iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(returned, urls.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(batch.failures().count(), 1);
        assert_eq!(batch.failures().next().unwrap().url(), urls[4]);

        let bodies: Vec<String> = batch.into_pages().into_iter().map(|p| p.body).collect();
        assert_eq!(bodies, vec!["page 0", "page 1", "page 2", "page 3", "page 5"]);
    }

    #[tokio::test]
    async fn test_connection_refused_is_exhausted() {
        let mut config = FetchConfig::new("test-key");
        config.proxy_url = "http://127.0.0.1:9/v1/".to_string();
        config.retry = RetryPolicy::default().with_wait(Duration::from_millis(10));

        let fetcher = Fetcher::new(&config).unwrap();
        let err = fetcher.fetch("https://site.test/riders/4").await.unwrap_err();
        assert!(matches!(err, FetchError::Exhausted { attempts: 3, .. }));
    }
}
