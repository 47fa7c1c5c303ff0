//! Crawler module for per-site feed synchronization
//!
//! This module contains the core crawling logic, including:
//! - HTTP client construction
//! - The per-site worker and its state progression
//! - Bounded, cancellable dispatch of workers across sites

mod fetcher;
mod orchestrator;
mod worker;

pub use fetcher::{build_http_client, user_agent_string};
pub use orchestrator::{Orchestrator, RunSummary};
pub use worker::{CrawlContext, CrawlWorker, SiteReport};

use crate::config::Config;
use crate::feed::FeedClient;
use crate::MirrorError;

/// Builds the shared worker context from a loaded configuration
pub fn build_context(config: &Config) -> Result<CrawlContext, MirrorError> {
    let client = build_http_client(
        &config.user_agent,
        &config.feed,
        config.crawler.request_timeout(),
    )?;
    let feeds = FeedClient::new(client, &config.feed);
    Ok(CrawlContext::new(feeds, config.crawler.crawl_delay()))
}
