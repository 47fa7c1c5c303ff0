use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Catalog-Mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    pub images: ImagesConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Fixed wait before every detail and image request (milliseconds)
    #[serde(rename = "crawl-delay-ms", default = "default_crawl_delay_ms")]
    pub crawl_delay_ms: u64,

    /// Number of sites crawled concurrently
    #[serde(rename = "pool-size", default = "default_pool_size")]
    pub pool_size: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl CrawlerConfig {
    /// Crawl delay as a [`Duration`]
    pub fn crawl_delay(&self) -> Duration {
        Duration::from_millis(self.crawl_delay_ms)
    }

    /// Request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Remote feed layout
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// URL scheme used to reach every site
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Path of the full catalog feed
    #[serde(rename = "catalog-path", default = "default_feed_path")]
    pub catalog_path: String,

    /// Path of the per-product detail feed (queried with `?code=`)
    #[serde(rename = "detail-path", default = "default_feed_path")]
    pub detail_path: String,

    /// Skip TLS certificate verification for feed and image requests
    #[serde(rename = "accept-invalid-certs", default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            catalog_path: default_feed_path(),
            detail_path: default_feed_path(),
            accept_invalid_certs: default_accept_invalid_certs(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Catalog database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Operator tag written to the `user_load` column
    #[serde(default)]
    pub operator: Option<String>,
}

/// Image mirror configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    /// Root directory of the local image mirror
    #[serde(rename = "base-path")]
    pub base_path: String,
}

fn default_crawl_delay_ms() -> u64 {
    150
}

fn default_pool_size() -> u32 {
    4
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_feed_path() -> String {
    "/feedxml_crm.php".to_string()
}

fn default_accept_invalid_certs() -> bool {
    true
}
