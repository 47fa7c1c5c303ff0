//! Catalog-Mirror: per-site XML product feed synchronizer
//!
//! This crate pulls product catalogs published as XML feeds by many remote
//! sites, mirrors each product's images to local disk and keeps a SQLite
//! catalog current, running one isolated worker per site.

pub mod config;
pub mod crawler;
pub mod feed;
pub mod images;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Catalog-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed error: {0}")]
    Feed(#[from] feed::FeedError),

    #[error("Image error: {0}")]
    Image(#[from] images::ImageError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SiteState,
        to: state::SiteState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Raised when a run is interrupted from outside
///
/// Kept apart from [`MirrorError`]'s other variants because per-site failure
/// containment must never swallow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("crawl cancelled")]
pub struct Cancelled;

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Catalog-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlWorker, Orchestrator, RunSummary, SiteReport};
pub use feed::{CatalogDocument, CatalogEntry, FeedClient, ProductDetail};
pub use images::{ImageFetcher, ImagePaths};
pub use state::SiteState;
pub use storage::{CatalogStore, SqliteStorage};
