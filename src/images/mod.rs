//! Product image mirroring
//!
//! Downloads the small and large image of a catalog entry into
//! `<base_path>/<site>/<published path>`, creating directories on demand.

use crate::feed::CatalogEntry;
use reqwest::Client;
use std::path::{Component, Path};
use std::time::Duration;
use thiserror::Error;

/// Failures that abort a whole image download call
///
/// A non-success status for one image is not an error here; that image's
/// path is just left empty.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Local paths of the mirrored images; empty when an image was not stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePaths {
    pub small: String,
    pub large: String,
}

/// Joins a published path onto a prefix without doubling the separator
///
/// `"/img/a.jpg"` is appended as-is, `"img/a.jpg"` gets a `/` in front.
pub fn join_published_path(prefix: &str, published: &str) -> String {
    if published.starts_with('/') {
        format!("{}{}", prefix, published)
    } else {
        format!("{}/{}", prefix, published)
    }
}

/// Local mirror path of a published image path
pub fn local_image_path(base_path: &str, site: &str, published: &str) -> String {
    join_published_path(&format!("{}/{}", base_path, site), published)
}

/// Rejects paths that would climb out of the site directory
fn is_contained(published: &str) -> bool {
    !Path::new(published)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
}

/// Downloads images with a fixed pause before each request
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    delay: Duration,
}

impl ImageFetcher {
    pub fn new(client: Client, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// Mirrors the entry's small and large images
    ///
    /// `origin` is the site root the published paths are relative to
    /// (e.g. `http://shop.example`). Either image may be absent from the
    /// entry. A transport failure or write failure aborts the call.
    pub async fn fetch_images(
        &self,
        origin: &str,
        site: &str,
        entry: &CatalogEntry,
        base_path: &str,
    ) -> Result<ImagePaths, ImageError> {
        let code = entry.code.as_deref().unwrap_or("<none>");
        let mut paths = ImagePaths::default();

        if let Some(published) = entry.img_small.as_deref() {
            paths.small = self
                .fetch_one(origin, site, code, published, base_path)
                .await?;
        }

        if let Some(published) = entry.img_large.as_deref() {
            paths.large = self
                .fetch_one(origin, site, code, published, base_path)
                .await?;
        }

        Ok(paths)
    }

    async fn fetch_one(
        &self,
        origin: &str,
        site: &str,
        code: &str,
        published: &str,
        base_path: &str,
    ) -> Result<String, ImageError> {
        if !is_contained(published) {
            tracing::warn!(
                "Refusing image path {} for product {} of {}",
                published,
                code,
                site
            );
            return Ok(String::new());
        }

        tokio::time::sleep(self.delay).await;

        let url = join_published_path(origin, published);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ImageError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                "Error {} when downloading image {} for {} of {}",
                status.as_u16(),
                published,
                code,
                site
            );
            return Ok(String::new());
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ImageError::Transport {
                url: url.clone(),
                source,
            })?;

        let path = local_image_path(base_path, site, published);
        write_file(&path, &body).await?;
        tracing::debug!("Stored image {} ({} bytes)", path, body.len());

        Ok(path)
    }
}

async fn write_file(path: &str, body: &[u8]) -> Result<(), ImageError> {
    let io_err = |source| ImageError::Io {
        path: path.to_string(),
        source,
    };

    if let Some(parent) = Path::new(path).parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, body).await.map_err(io_err)
}
