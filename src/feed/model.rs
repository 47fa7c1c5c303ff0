//! Typed feed records
//!
//! Feed fields arrive as free text. Each one is read into a [`Field`] so that
//! "the element was not there" and "the element was there but unreadable"
//! stay distinct, even though storage ends up treating both the same way.

use crate::feed::xml::XmlElement;

/// A feed value after schema-bound parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Element or attribute absent, or present with empty text
    Missing,
    /// Present but not parseable; keeps the raw text
    Invalid(String),
    /// Parsed value
    Value(T),
}

impl<T: Copy> Field<T> {
    /// The parsed value, or `default` when missing or invalid
    pub fn value_or(&self, default: T) -> T {
        match self {
            Self::Value(v) => *v,
            Self::Missing | Self::Invalid(_) => default,
        }
    }

    /// The parsed value, if any
    pub fn value(&self) -> Option<T> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Missing | Self::Invalid(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl Field<bool> {
    /// Legacy rule: only the exact text `"true"` counts as true
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Value(true))
    }
}

/// Reads a price-like number
///
/// Integers parse directly, decimals are truncated toward zero.
pub fn parse_number(raw: Option<&str>) -> Field<i64> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Field::Missing;
    };

    if let Ok(n) = text.parse::<i64>() {
        return Field::Value(n);
    }

    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Field::Value(f.trunc() as i64),
        _ => Field::Invalid(text.to_string()),
    }
}

/// Reads an availability flag
pub fn parse_flag(raw: Option<&str>) -> Field<bool> {
    match raw {
        None | Some("") => Field::Missing,
        Some("true") => Field::Value(true),
        Some("false") => Field::Value(false),
        Some(other) => Field::Invalid(other.to_string()),
    }
}

/// One product as listed in a site's catalog feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub available: Field<bool>,
    pub price: Field<i64>,
    pub price_old: Field<i64>,
    pub currency: Option<String>,
    pub img_small: Option<String>,
    pub img_large: Option<String>,
}

impl CatalogEntry {
    pub fn from_element(element: &XmlElement) -> Self {
        Self {
            code: owned(element.child_text("code")),
            name: owned(element.child_text("name")),
            url: owned(element.child_text("url")),
            // "avalible" is how the feeds spell it
            available: parse_flag(element.child_text("avalible")),
            price: parse_number(element.child_text("price")),
            price_old: parse_number(element.child_text("price_old")),
            currency: owned(element.child_text("currency")),
            img_small: owned(element.child_text("img_small")),
            img_large: owned(element.child_text("img_large")),
        }
    }
}

/// A full catalog pull
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDocument {
    /// Raw `timestamp` attribute of the root element
    pub timestamp: Option<String>,
    /// Entries in feed order
    pub entries: Vec<CatalogEntry>,
}

impl CatalogDocument {
    /// Builds the document from a parsed root
    ///
    /// Live feeds wrap the entries in a single container under the root;
    /// flat feeds list them directly. Any child of the root that itself
    /// carries a `code` means the flat layout, so one entry without a code
    /// cannot hide the rest of the catalog.
    pub fn from_root(root: &XmlElement) -> Self {
        let flat = root.children.iter().any(|c| c.child("code").is_some());
        let container = match root.first_child() {
            Some(first) if !flat => first,
            _ => root,
        };

        Self {
            timestamp: owned(root.attr("timestamp")),
            entries: container
                .children
                .iter()
                .map(CatalogEntry::from_element)
                .collect(),
        }
    }

    /// The batch timestamp as stored in `time_xml`
    ///
    /// Passed through without any freshness check.
    pub fn batch_timestamp(&self) -> Option<i64> {
        self.timestamp.as_deref().and_then(|t| t.trim().parse().ok())
    }
}

/// A sellable sub-option declared under `params`, kept as raw attribute text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    pub name: Option<String>,
    pub available: Option<String>,
    pub price: Option<String>,
    pub price_old: Option<String>,
}

impl VariantSpec {
    pub fn from_element(element: &XmlElement) -> Self {
        Self {
            name: owned(element.attr("name")),
            available: owned(element.attr("avalible")),
            price: owned(element.attr("price")),
            price_old: owned(element.attr("price_old")),
        }
    }
}

/// The detail document of one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetail {
    pub code: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub available: Field<bool>,
    pub price: Field<i64>,
    pub price_old: Field<i64>,
    /// `None` when the document has no (or an empty) `params` container
    pub params: Option<Vec<VariantSpec>>,
}

impl ProductDetail {
    pub fn from_element(element: &XmlElement) -> Self {
        let params = element
            .child("params")
            .filter(|p| !p.children.is_empty())
            .map(|p| p.children.iter().map(VariantSpec::from_element).collect());

        Self {
            code: owned(element.child_text("code")),
            name: owned(element.child_text("name")),
            url: owned(element.child_text("url")),
            available: parse_flag(element.child_text("avalible")),
            price: parse_number(element.child_text("price")),
            price_old: parse_number(element.child_text("price_old")),
            params,
        }
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
