//! Statistics from the catalog database
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the storage layer.

use crate::storage::CatalogStore;
use crate::MirrorError;

/// Stored rows of one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteStatistics {
    pub site: String,
    pub products: u64,
    pub variants: u64,
}

/// Catalog statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatistics {
    /// Number of sites in the registry
    pub registered_sites: u64,

    /// Sites that ever had a product stored, ordered by name
    pub sites: Vec<SiteStatistics>,
}

impl CatalogStatistics {
    pub fn total_products(&self) -> u64 {
        self.sites.iter().map(|s| s.products).sum()
    }

    pub fn total_variants(&self) -> u64 {
        self.sites.iter().map(|s| s.variants).sum()
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(MirrorError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn CatalogStore) -> Result<CatalogStatistics, MirrorError> {
    let registered_sites = storage.list_sites()?.len() as u64;

    let sites = storage
        .count_by_site()?
        .into_iter()
        .map(|(site, products, variants)| SiteStatistics {
            site,
            products,
            variants,
        })
        .collect();

    Ok(CatalogStatistics {
        registered_sites,
        sites,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Registered sites: {}", stats.registered_sites);
    println!("  Sites with products: {}", stats.sites.len());
    println!("  Total products: {}", stats.total_products());
    println!("  Total variants: {}", stats.total_variants());
    println!();

    if stats.sites.is_empty() {
        println!("No products stored yet");
        return;
    }

    println!("Products by Site:");
    let width = stats.sites.iter().map(|s| s.site.len()).max().unwrap_or(0);
    for site in &stats.sites {
        println!(
            "  {:<width$}  {:>8} products  {:>8} variants",
            site.site,
            site.products,
            site.variants,
            width = width
        );
    }
}
