//! HTTP client for catalog and detail feeds

use crate::config::FeedConfig;
use crate::feed::model::{CatalogDocument, ProductDetail};
use crate::feed::xml::parse_document;
use reqwest::Client;
use thiserror::Error;

/// Why a feed request produced no usable document
#[derive(Debug, Error)]
pub enum FeedError {
    /// Connection failure, timeout, or body read failure
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Body was not well-formed XML
    #[error("malformed XML from {url}: {message}")]
    Xml { url: String, message: String },

    /// Catalog root had no children
    #[error("empty product list for site {site}")]
    EmptyFeed { site: String },

    /// Detail document lacked the root → product → detail nesting
    #[error("no detail for product {code} of site {site}")]
    NoDetail { site: String, code: String },
}

impl FeedError {
    /// HTTP status code, when the failure was a protocol failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Issues catalog and detail requests against a site
///
/// Sites are addressed by host name (optionally with a port); the scheme and
/// feed paths come from [`FeedConfig`]. Cloning is cheap and shares the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    scheme: String,
    catalog_path: String,
    detail_path: String,
}

impl FeedClient {
    pub fn new(client: Client, config: &FeedConfig) -> Self {
        Self {
            client,
            scheme: config.scheme.clone(),
            catalog_path: config.catalog_path.clone(),
            detail_path: config.detail_path.clone(),
        }
    }

    /// The shared HTTP client
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// `scheme://site`, the root that image paths are resolved against
    pub fn origin(&self, site: &str) -> String {
        format!("{}://{}", self.scheme, site)
    }

    pub fn catalog_url(&self, site: &str) -> String {
        format!("{}{}", self.origin(site), self.catalog_path)
    }

    pub fn detail_url(&self, site: &str) -> String {
        format!("{}{}", self.origin(site), self.detail_path)
    }

    /// Fetches the full catalog of a site
    ///
    /// An XML root without children is reported as [`FeedError::EmptyFeed`]:
    /// a site that suddenly lists nothing is far more likely broken than
    /// sold out.
    pub async fn fetch_catalog(&self, site: &str) -> Result<CatalogDocument, FeedError> {
        let url = self.catalog_url(site);
        tracing::debug!("Fetching catalog: {}", url);

        let body = self.get_body(&url, None).await?;
        let root = parse_document(&body).map_err(|e| FeedError::Xml {
            url: url.clone(),
            message: e.to_string(),
        })?;

        if root.children.is_empty() {
            return Err(FeedError::EmptyFeed {
                site: site.to_string(),
            });
        }

        Ok(CatalogDocument::from_root(&root))
    }

    /// Fetches the detail document of one product
    ///
    /// The detail lives two levels below the root; anything shallower is
    /// [`FeedError::NoDetail`].
    pub async fn fetch_product_detail(
        &self,
        site: &str,
        code: &str,
    ) -> Result<ProductDetail, FeedError> {
        let url = self.detail_url(site);
        tracing::debug!("Fetching detail for product {}: {}", code, url);

        let body = self.get_body(&url, Some(code)).await?;
        let root = parse_document(&body).map_err(|e| FeedError::Xml {
            url: url.clone(),
            message: e.to_string(),
        })?;

        root.first_child()
            .and_then(|product| product.first_child())
            .map(ProductDetail::from_element)
            .ok_or_else(|| FeedError::NoDetail {
                site: site.to_string(),
                code: code.to_string(),
            })
    }

    /// Raw response body; decoding is left to the XML declaration
    async fn get_body(&self, url: &str, code: Option<&str>) -> Result<Vec<u8>, FeedError> {
        let mut request = self.client.get(url);
        if let Some(code) = code {
            request = request.query(&[("code", code)]);
        }

        let response = request.send().await.map_err(|source| FeedError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| FeedError::Transport {
                url: url.to_string(),
                source,
            })?;

        Ok(bytes.to_vec())
    }
}
