//! Runs one worker per site on a bounded pool

use super::worker::{guarded, CrawlContext, CrawlWorker, SiteReport};
use crate::state::SiteState;
use crate::storage::{CatalogStore, Site, StoreConnector};
use crate::{Cancelled, MirrorError};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Reports of every site that ran to an outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub reports: Vec<SiteReport>,
}

impl RunSummary {
    /// Sites whose catalog was fully processed
    pub fn completed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.state.is_success())
            .count()
    }

    /// Sites that ended in `Failed`, including those whose store never opened
    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.state == SiteState::Failed)
            .count()
    }

    /// Products written across all sites
    pub fn stored(&self) -> usize {
        self.reports.iter().map(|r| r.stored).sum()
    }

    /// The report of one site, if it ran
    pub fn report(&self, site: &str) -> Option<&SiteReport> {
        self.reports.iter().find(|r| r.site == site)
    }
}

/// Dispatches site workers, at most `pool_size` at a time
///
/// Each worker runs in its own tokio task with its own store connection,
/// inside a `site` tracing span. The orchestrator never touches a store
/// while workers are running.
pub struct Orchestrator<C: StoreConnector> {
    /// Opens one store per worker
    connector: Arc<C>,

    /// Cloned into every worker
    context: CrawlContext,

    /// Shared by the orchestrator and all of its workers
    cancel: CancellationToken,
}

impl<C: StoreConnector> Orchestrator<C> {
    /// Creates an orchestrator
    ///
    /// # Arguments
    ///
    /// * `connector` - Opens a fresh store for each site
    /// * `context` - Feed client, image fetcher and crawl delay for all workers
    /// * `cancel` - Token that interrupts the run; see [`cancel_token`](Self::cancel_token)
    pub fn new(connector: C, context: CrawlContext, cancel: CancellationToken) -> Self {
        Self {
            connector: Arc::new(connector),
            context,
            cancel,
        }
    }

    /// Token that interrupts the run when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls every registered site
    ///
    /// The site list is read once, on a connection that is closed before any
    /// worker starts.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Every site ran to `Done` or `Failed`
    /// * `Err(MirrorError::Storage)` - The site registry could not be read
    /// * `Err(MirrorError::Cancelled)` - The run was interrupted
    pub async fn run_all(&self, base_path: &str, pool_size: usize) -> Result<RunSummary, MirrorError> {
        let sites = {
            let store = self.connector.connect()?;
            store.list_sites()?
        };
        tracing::info!("{} sites registered", sites.len());

        Ok(self.run(sites, base_path, pool_size).await?)
    }

    /// Crawls the given sites and waits for every worker to finish
    ///
    /// A site's failure only shows up in its report. Cancellation stops
    /// dispatching, lets the running workers wind down and is then returned.
    ///
    /// # Arguments
    ///
    /// * `sites` - Sites to crawl, dispatched in order
    /// * `base_path` - Root of the local image mirror
    /// * `pool_size` - Maximum number of concurrent workers (at least one)
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Reports sorted by site name
    /// * `Err(Cancelled)` - The token fired before every site finished
    pub async fn run(
        &self,
        sites: Vec<Site>,
        base_path: &str,
        pool_size: usize,
    ) -> Result<RunSummary, Cancelled> {
        let semaphore = Arc::new(Semaphore::new(pool_size.max(1)));
        let mut workers = JoinSet::new();
        let mut cancelled = false;

        for site in sites {
            let permit = match guarded(&self.cancel, Arc::clone(&semaphore).acquire_owned()).await {
                Ok(Ok(permit)) => permit,
                Ok(Err(_closed)) => break,
                Err(Cancelled) => {
                    cancelled = true;
                    break;
                }
            };

            let span = tracing::info_span!("site", site = %site.name);
            let connector = Arc::clone(&self.connector);
            let context = self.context.clone();
            let cancel = self.cancel.clone();
            let base_path = base_path.to_string();

            workers.spawn(
                async move {
                    let _permit = permit;
                    run_site(connector.as_ref(), site.name, context, base_path, cancel).await
                }
                .instrument(span),
            );
        }

        let mut summary = RunSummary::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(report)) => summary.reports.push(report),
                Ok(Err(Cancelled)) => {
                    cancelled = true;
                    self.cancel.cancel();
                }
                Err(e) => tracing::error!("Site worker panicked: {}", e),
            }
        }

        if cancelled {
            tracing::warn!(
                "Run cancelled after {} sites finished",
                summary.reports.len()
            );
            return Err(Cancelled);
        }

        summary.reports.sort_by(|a, b| a.site.cmp(&b.site));
        tracing::info!(
            "Run finished: {} sites completed, {} failed, {} products stored",
            summary.completed(),
            summary.failed(),
            summary.stored()
        );
        Ok(summary)
    }
}

/// Connects a fresh store and runs the site's worker on it
async fn run_site<C: StoreConnector>(
    connector: &C,
    site: String,
    context: CrawlContext,
    base_path: String,
    cancel: CancellationToken,
) -> Result<SiteReport, Cancelled> {
    let store = match connector.connect() {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Cannot open storage for site {}: {}", site, e);
            return Ok(SiteReport::failed(&site, e.to_string()));
        }
    };

    CrawlWorker::new(site, context, store, base_path, cancel)
        .run()
        .await
}
