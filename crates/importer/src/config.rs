use std::time::Duration;

use crate::fetch::RetryPolicy;
use crate::{ImporterError, Result};

pub const DEFAULT_PROXY_URL: &str = "https://proxy.scrapeops.io/v1/";
pub const DEFAULT_SITE_URL: &str = "https://www.motogp.com";
pub const DEFAULT_API_URL: &str = "https://api.motogp.pulselive.com/motogp/v1";
pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for the proxied page fetcher.
#[derive(Clone)]
pub struct FetchConfig {
    pub proxy_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl FetchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

// Keeps the proxy key out of logs.
impl std::fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchConfig")
            .field("proxy_url", &self.proxy_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("concurrency", &self.concurrency)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Where the scraped site and the results API live.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub riders_path: String,
    pub calendar_path: String,
    pub api_url: String,
}

impl SiteConfig {
    pub fn riders_url(&self) -> String {
        self.join(&self.riders_path)
    }

    pub fn calendar_url(&self) -> String {
        self.join(&self.calendar_path)
    }

    fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SITE_URL.to_string(),
            riders_path: "/en/riders/motogp".to_string(),
            calendar_path: "/en/calendar".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Process-wide settings, built once at startup and passed down by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub fetch: FetchConfig,
    pub site: SiteConfig,
    /// Year used to complete the calendar's day/month dates.
    pub season: i32,
}

impl Config {
    pub fn new(fetch: FetchConfig, site: SiteConfig, season: i32) -> Self {
        Self {
            fetch,
            site,
            season,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `SCRAPEOPS_API_KEY` is required; everything else falls back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("SCRAPEOPS_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ImporterError::ConfigError("Cannot load SCRAPEOPS_API_KEY env variable".to_string())
            })?;

        let mut fetch = FetchConfig::new(api_key);
        if let Some(proxy_url) = lookup("GP_PROXY_URL") {
            fetch.proxy_url = proxy_url;
        }
        if let Some(concurrency) = lookup("GP_CONCURRENCY") {
            fetch.concurrency = parse_number("GP_CONCURRENCY", &concurrency)?;
            if fetch.concurrency == 0 {
                return Err(ImporterError::ConfigError(
                    "GP_CONCURRENCY must be at least 1".to_string(),
                ));
            }
        }

        let mut site = SiteConfig::default();
        if let Some(base_url) = lookup("GP_SITE_URL") {
            site.base_url = base_url;
        }
        if let Some(api_url) = lookup("GP_API_URL") {
            site.api_url = api_url;
        }

        let season = match lookup("GP_SEASON") {
            Some(season) => parse_number("GP_SEASON", &season)?,
            None => chrono::Datelike::year(&chrono::Utc::now().date_naive()),
        };

        Ok(Self::new(fetch, site, season))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ImporterError::ConfigError(format!("{key} must be a number, got '{value}'")))
}
