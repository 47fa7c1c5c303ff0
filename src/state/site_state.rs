/// Site crawl state definitions
///
/// A worker moves a site through these states exactly once per run.
use std::fmt;

/// Represents the current state of a site's crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteState {
    /// Worker created, nothing requested yet
    Idle,

    /// Catalog feed request in flight
    FetchingCatalog,

    /// Walking catalog entries
    PerProductLoop,

    // ===== Terminal States =====
    /// Every entry processed
    Done,

    /// Run aborted for this site
    Failed,
}

impl SiteState {
    /// Returns true if the run for this site is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Whether `next` may follow `self`
    ///
    /// States advance strictly in order; `Failed` is reachable from any
    /// non-terminal state.
    pub fn can_transition_to(&self, next: SiteState) -> bool {
        match (self, next) {
            (Self::Idle, Self::FetchingCatalog) => true,
            (Self::FetchingCatalog, Self::PerProductLoop) => true,
            (Self::PerProductLoop, Self::Done) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Lowercase name used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingCatalog => "fetching_catalog",
            Self::PerProductLoop => "per_product_loop",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
