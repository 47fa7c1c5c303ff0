//! Per-site crawl worker
//!
//! Drives one site from catalog pull to stored variants:
//!
//! 1. Fetch the catalog (failure ends the site's run)
//! 2. Load the codes already stored for the site, once
//! 3. For each new entry, in feed order: mirror images, upsert the product,
//!    then fetch the detail and upsert its variants
//!
//! Everything except cancellation is contained here; the orchestrator only
//! ever sees a [`SiteReport`] or [`Cancelled`].

use crate::feed::{CatalogEntry, FeedClient};
use crate::images::{ImageFetcher, ImagePaths};
use crate::state::SiteState;
use crate::storage::CatalogStore;
use crate::{Cancelled, MirrorError};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What a worker needs besides its store; shared by every worker of a run
#[derive(Debug, Clone)]
pub struct CrawlContext {
    pub feeds: FeedClient,
    pub images: ImageFetcher,
    /// Pause before each detail request
    pub crawl_delay: Duration,
}

impl CrawlContext {
    pub fn new(feeds: FeedClient, crawl_delay: Duration) -> Self {
        let images = ImageFetcher::new(feeds.http().clone(), crawl_delay);
        Self {
            feeds,
            images,
            crawl_delay,
        }
    }
}

/// Outcome of one site's run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub site: String,
    pub state: SiteState,
    /// Entries listed in the catalog
    pub entries: usize,
    /// Entries skipped because their code was already stored
    pub skipped: usize,
    /// Entries skipped because they carried no code
    pub missing_code: usize,
    /// Products written
    pub stored: usize,
    /// Products whose image download was aborted
    pub images_failed: usize,
    /// Products whose detail could not be obtained
    pub details_missing: usize,
    /// Variant rows written
    pub variants: usize,
    /// Why the site failed, if it did
    pub error: Option<String>,
}

impl SiteReport {
    pub fn new(site: &str) -> Self {
        Self {
            site: site.to_string(),
            state: SiteState::Idle,
            entries: 0,
            skipped: 0,
            missing_code: 0,
            stored: 0,
            images_failed: 0,
            details_missing: 0,
            variants: 0,
            error: None,
        }
    }

    /// A report for a site whose worker could not even start
    pub fn failed(site: &str, error: impl Into<String>) -> Self {
        Self {
            state: SiteState::Failed,
            error: Some(error.into()),
            ..Self::new(site)
        }
    }
}

/// Crawls and synchronizes a single site
///
/// A worker is built for one run of one site and consumed by [`run`].
/// It owns its store, so the connection lives exactly as long as the run.
///
/// [`run`]: CrawlWorker::run
pub struct CrawlWorker<S: CatalogStore> {
    /// Host (optionally `host:port`) the feeds are served from
    site: String,

    /// Shared HTTP clients and crawl delay
    context: CrawlContext,

    /// This worker's own connection
    store: S,

    /// Root of the local image mirror
    base_path: String,

    /// Interrupts every pending await when triggered
    cancel: CancellationToken,

    state: SiteState,
}

impl<S: CatalogStore> CrawlWorker<S> {
    /// Creates a worker in the `Idle` state
    ///
    /// # Arguments
    ///
    /// * `site` - Site name, used both in feed URLs and as the `site` column
    /// * `context` - Feed client, image fetcher and crawl delay shared by the run
    /// * `store` - Store connection owned by this worker
    /// * `base_path` - Directory that `<site>/<image path>` is resolved under
    /// * `cancel` - Token that aborts the run
    pub fn new(
        site: impl Into<String>,
        context: CrawlContext,
        store: S,
        base_path: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            site: site.into(),
            context,
            store,
            base_path: base_path.into(),
            cancel,
            state: SiteState::Idle,
        }
    }

    /// Current position in the site's run
    pub fn state(&self) -> SiteState {
        self.state
    }

    /// Runs the site to completion
    ///
    /// Consumes the worker so its store connection is released on every
    /// path.
    ///
    /// # Returns
    ///
    /// * `Ok(SiteReport)` - The site reached `Done`, or `Failed` with the
    ///   cause in [`SiteReport::error`]
    /// * `Err(Cancelled)` - The token fired; rows already written are kept
    pub async fn run(mut self) -> Result<SiteReport, Cancelled> {
        tracing::info!("Started site {}", self.site);

        let mut report = SiteReport::new(&self.site);
        match self.crawl(&mut report).await {
            Ok(()) => {
                tracing::info!(
                    "Finished site {}: {} stored, {} skipped, {} without detail",
                    self.site,
                    report.stored,
                    report.skipped,
                    report.details_missing
                );
            }
            Err(MirrorError::Cancelled(cancelled)) => {
                tracing::warn!("Site {} cancelled in state {}", self.site, self.state);
                return Err(cancelled);
            }
            Err(e) => {
                tracing::error!("Skipping site {} ({}): {}", self.site, self.state, e);
                self.state = SiteState::Failed;
                report.error = Some(e.to_string());
            }
        }

        report.state = self.state;
        Ok(report)
    }

    /// Catalog pull followed by the per-product loop
    async fn crawl(&mut self, report: &mut SiteReport) -> Result<(), MirrorError> {
        self.advance(SiteState::FetchingCatalog)?;
        let catalog = guarded(&self.cancel, self.context.feeds.fetch_catalog(&self.site)).await??;
        let batch_timestamp = catalog.batch_timestamp();
        report.entries = catalog.entries.len();

        self.advance(SiteState::PerProductLoop)?;
        let processed = self.store.list_processed_codes(&self.site)?;
        tracing::debug!(
            "{} catalog entries, {} codes already stored",
            catalog.entries.len(),
            processed.len()
        );

        for entry in &catalog.entries {
            if self.cancel.is_cancelled() {
                return Err(Cancelled.into());
            }

            let Some(code) = entry.code.as_deref() else {
                report.missing_code += 1;
                continue;
            };

            if processed.contains(code) {
                report.skipped += 1;
                continue;
            }

            self.sync_product(entry, code, batch_timestamp, report)
                .await?;
        }

        tracing::info!(
            "Skipped {} products as they were already stored",
            report.skipped
        );
        self.advance(SiteState::Done)?;
        Ok(())
    }

    /// Images, product row, detail, variant rows; in that order
    ///
    /// Image and detail failures are counted in the report and do not stop
    /// the loop. Storage failures do.
    async fn sync_product(
        &mut self,
        entry: &CatalogEntry,
        code: &str,
        batch_timestamp: Option<i64>,
        report: &mut SiteReport,
    ) -> Result<(), MirrorError> {
        let origin = self.context.feeds.origin(&self.site);
        let images = self
            .context
            .images
            .fetch_images(&origin, &self.site, entry, &self.base_path);

        let paths = match guarded(&self.cancel, images).await? {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!("Images were not downloaded for product code {}: {}", code, e);
                report.images_failed += 1;
                ImagePaths::default()
            }
        };

        self.store
            .upsert_product(&self.site, entry, batch_timestamp, &paths.small, &paths.large)?;
        report.stored += 1;

        guarded(&self.cancel, tokio::time::sleep(self.context.crawl_delay)).await?;
        tracing::info!("Getting product {} info", code);
        let detail = guarded(
            &self.cancel,
            self.context.feeds.fetch_product_detail(&self.site, code),
        )
        .await?;

        match detail {
            Ok(mut detail) => {
                if detail.code.is_none() {
                    detail.code = Some(code.to_string());
                }
                report.variants += self
                    .store
                    .upsert_variants(&self.site, &detail, batch_timestamp)?;
            }
            Err(e) => {
                match e.status() {
                    Some(status) => tracing::info!(
                        "Error {} when getting product sizes for product code {}",
                        status,
                        code
                    ),
                    None => tracing::info!(
                        "Cannot get product sizes for product code {}: {}",
                        code,
                        e
                    ),
                }
                report.details_missing += 1;
            }
        }

        Ok(())
    }

    /// Moves to `next`, refusing transitions the state machine forbids
    fn advance(&mut self, next: SiteState) -> Result<(), MirrorError> {
        if !self.state.can_transition_to(next) {
            return Err(MirrorError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("Site {}: {} -> {}", self.site, self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Races `fut` against the cancellation token
///
/// Cancellation wins ties so an interrupted run stops before issuing
/// anything new.
pub(crate) async fn guarded<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, Cancelled> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Cancelled),
        out = fut => Ok(out),
    }
}
