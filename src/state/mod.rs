//! State module for tracking crawl progress
//!
//! - `SiteState`: where a site's crawl worker is in its run

mod site_state;

pub use site_state::SiteState;
