//! Remote feed access
//!
//! This module contains everything needed to turn a site's XML feeds into
//! typed records:
//! - `xml`: a small element tree built on `quick-xml`
//! - `model`: schema-bound catalog, detail and variant records
//! - `client`: HTTP requests against the catalog and detail endpoints

mod client;
mod model;
mod xml;

pub use client::{FeedClient, FeedError};
pub use model::{
    parse_flag, parse_number, CatalogDocument, CatalogEntry, Field, ProductDetail, VariantSpec,
};
pub use xml::{parse_document, XmlElement, XmlError};
