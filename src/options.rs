//! Filter option sets derived from observed data.

use crate::schema::{Dataset, Field, Value};
use serde::Serialize;
use std::collections::BTreeSet;

/// Distinct, non-missing, non-blank values of `field`, sorted ascending.
///
/// When nothing qualifies the result is `[fallback]` if one is given,
/// otherwise empty.
pub fn resolve(dataset: &Dataset, field: &str, fallback: Option<Value>) -> Vec<Value> {
    let distinct: BTreeSet<&Value> = dataset
        .column(field)
        .filter(|v| !v.is_missing() && !v.is_blank())
        .collect();

    if distinct.is_empty() {
        return fallback.into_iter().collect();
    }
    distinct.into_iter().cloned().collect()
}

/// Inclusive span of observed `Year Joined` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearSpan {
    pub min: i64,
    pub max: i64,
}

impl YearSpan {
    /// Only one distinct year is present.
    pub fn is_single(&self) -> bool {
        self.min == self.max
    }
}

/// `(min, max)` of non-missing years, or `None` when the dataset has no year data.
pub fn resolve_years(dataset: &Dataset) -> Option<YearSpan> {
    dataset
        .column(Field::YearJoined.name())
        .filter_map(Value::as_integer)
        .fold(None, |span, year| match span {
            None => Some(YearSpan { min: year, max: year }),
            Some(YearSpan { min, max }) => Some(YearSpan {
                min: min.min(year),
                max: max.max(year),
            }),
        })
}

/// Every option list the filter controls need, resolved once per upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub firms: Vec<Value>,
    pub offices: Vec<Value>,
    pub years: Option<YearSpan>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            firms: resolve(dataset, Field::FirmName.name(), Some(Field::FirmName.default_value())),
            offices: resolve(dataset, Field::CurrentOffice.name(), None),
            years: resolve_years(dataset),
        }
    }
}
