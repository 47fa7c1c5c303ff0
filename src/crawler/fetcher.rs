//! HTTP client construction
//!
//! One `reqwest::Client` is built per run and shared (it is reference
//! counted) by the feed client and the image fetcher of every worker.

use crate::config::{FeedConfig, UserAgentConfig};
use reqwest::Client;
use std::time::Duration;

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use catalog_mirror::config::{FeedConfig, UserAgentConfig};
/// use catalog_mirror::crawler::build_http_client;
/// use std::time::Duration;
///
/// let agent = UserAgentConfig {
///     crawler_name: "CatalogMirror".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&agent, &FeedConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    feed: &FeedConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .danger_accept_invalid_certs(feed.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}
