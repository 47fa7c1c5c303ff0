//! Effective values of product variant rows

use crate::feed::{parse_flag, parse_number, Field, ProductDetail, VariantSpec};

/// Columns of one variant row that depend on the detail document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantValues {
    pub param_name: Option<String>,
    pub param_available: Option<bool>,
    pub param_price: i64,
    pub param_price_old: i64,
}

/// Computes the rows to write for a detail document
///
/// With a `params` container, each declared variant yields a row: its own
/// price is used unless empty or `"0"`, in which case the parent's applies;
/// an unreadable value ends up as zero. Availability is never inherited.
/// Without one, a single unnamed row mirrors the parent's own values.
pub fn resolve_variants(detail: &ProductDetail) -> Vec<VariantValues> {
    match &detail.params {
        Some(params) => params
            .iter()
            .map(|spec| resolve_declared(spec, detail))
            .collect(),
        None => vec![VariantValues {
            param_name: None,
            param_available: Some(detail.available.is_true()),
            param_price: detail.price.value_or(0),
            param_price_old: detail.price_old.value_or(0),
        }],
    }
}

fn resolve_declared(spec: &VariantSpec, parent: &ProductDetail) -> VariantValues {
    VariantValues {
        param_name: spec.name.clone(),
        param_available: spec
            .available
            .as_deref()
            .map(|raw| parse_flag(Some(raw)).is_true()),
        param_price: with_fallback(spec.price.as_deref(), &parent.price),
        param_price_old: with_fallback(spec.price_old.as_deref(), &parent.price_old),
    }
}

fn with_fallback(own: Option<&str>, parent: &Field<i64>) -> i64 {
    match own.map(str::trim) {
        None | Some("") | Some("0") => parent.value_or(0),
        Some(raw) => parse_number(Some(raw)).value_or(0),
    }
}
