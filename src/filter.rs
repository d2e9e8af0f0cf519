//! Compound filters over a normalized dataset.
//!
//! Categorical constraints and the year range combine with AND. A field whose
//! accepted set is empty is unconstrained. Whenever a year range is active,
//! records without a year are excluded, however wide the range.

use crate::options::{FilterOptions, YearSpan};
use crate::schema::{Dataset, Field, Value};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Inclusive bounds on `Year Joined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub lower: i64,
    pub upper: i64,
}

impl YearRange {
    pub fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, year: i64) -> bool {
        self.lower <= year && year <= self.upper
    }
}

impl From<YearSpan> for YearRange {
    fn from(span: YearSpan) -> Self {
        Self::new(span.min, span.max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub categorical: BTreeMap<String, BTreeSet<Value>>,
    pub year_range: Option<YearRange>,
}

impl FilterSpec {
    /// No categorical selection, year range spanning all observed years.
    pub fn for_options(options: &FilterOptions) -> Self {
        Self {
            categorical: BTreeMap::new(),
            year_range: options.years.map(YearRange::from),
        }
    }

    /// The selection the dashboard widgets start out with.
    pub fn initial(options: &FilterOptions, limits: &SelectionLimits) -> Self {
        let firms = options.firms.iter().take(limits.firms).cloned();
        let offices: Vec<Value> = if options.offices.len() <= limits.offices_all_up_to {
            options.offices.clone()
        } else {
            options.offices.iter().take(limits.offices_fallback).cloned().collect()
        };
        Self::for_options(options)
            .with_values(Field::FirmName.name(), firms)
            .with_values(Field::CurrentOffice.name(), offices)
    }

    /// Accept `values` for `field`, unioned with any values already accepted.
    pub fn with_values<I>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.categorical
            .entry(field.to_string())
            .or_default()
            .extend(values);
        self
    }

    pub fn with_year_range(mut self, range: Option<YearRange>) -> Self {
        self.year_range = range;
        self
    }

    /// True when no constraint of any kind is active.
    pub fn is_unconstrained(&self) -> bool {
        self.year_range.is_none() && self.categorical.values().all(BTreeSet::is_empty)
    }
}

/// Apply `spec` to `dataset`, returning the passing records in input order.
pub fn apply(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    let constraints: Vec<(Option<usize>, &BTreeSet<Value>)> = spec
        .categorical
        .iter()
        .filter(|(_, accepted)| !accepted.is_empty())
        .map(|(field, accepted)| (dataset.column_index(field), accepted))
        .collect();
    let year_idx = dataset.column_index(Field::YearJoined.name());

    let records = dataset
        .records
        .iter()
        .filter(|record| {
            constraints.iter().all(|(idx, accepted)| {
                let value = idx
                    .and_then(|i| record.values.get(i))
                    .unwrap_or(&Value::Missing);
                accepted.contains(value)
            })
        })
        .filter(|record| match spec.year_range {
            None => true,
            Some(range) => year_idx
                .and_then(|i| record.values.get(i))
                .and_then(Value::as_integer)
                .is_some_and(|year| range.contains(year)),
        })
        .cloned()
        .collect();

    let view = dataset.with_records(records);
    debug!(input = dataset.len(), output = view.len(), "applied filter");
    view
}

/// How many options the initial selection picks per control.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SelectionLimits {
    #[serde(default = "default_firms")]
    pub firms: usize,
    #[serde(default = "default_offices_all_up_to")]
    pub offices_all_up_to: usize,
    #[serde(default = "default_offices_fallback")]
    pub offices_fallback: usize,
}

fn default_firms() -> usize { 2 }
fn default_offices_all_up_to() -> usize { 5 }
fn default_offices_fallback() -> usize { 3 }

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            firms: 2,
            offices_all_up_to: 5,
            offices_fallback: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawTable;
    use crate::schema::normalize;

    fn make_data() -> Dataset {
        normalize(RawTable::from_strings(
            &["Firm Name", "Current Office", "Year Joined"],
            &[
                &["A", "London", "2020"],
                &["A", "NYC", "2021"],
                &["B", "London", ""],
                &["C", "Paris", "2010"],
            ],
        ))
    }

    fn firms(view: &Dataset) -> Vec<String> {
        view.column("Firm Name").map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let ds = make_data();
        let view = apply(&ds, &FilterSpec::default());
        assert_eq!(view, ds);
    }

    #[test]
    fn test_categorical_membership() {
        let ds = make_data();
        let spec = FilterSpec::default().with_values("Firm Name", [Value::text("A")]);
        let view = apply(&ds, &spec);
        assert_eq!(firms(&view), vec!["A", "A"]);
    }

    #[test]
    fn test_empty_selection_unconstrained() {
        let ds = make_data();
        let spec = FilterSpec::default().with_values("Firm Name", Vec::<Value>::new());
        assert_eq!(apply(&ds, &spec).len(), 4);
        assert!(spec.is_unconstrained());
    }

    #[test]
    fn test_constraints_combine_with_and() {
        let ds = make_data();
        let spec = FilterSpec::default()
            .with_values("Firm Name", [Value::text("A"), Value::text("B")])
            .with_values("Current Office", [Value::text("London")]);
        assert_eq!(firms(&apply(&ds, &spec)), vec!["A", "B"]);
    }

    #[test]
    fn test_year_range_excludes_missing_years() {
        let ds = make_data();
        let spec = FilterSpec::default().with_year_range(Some(YearRange::new(i64::MIN, i64::MAX)));
        let view = apply(&ds, &spec);
        assert_eq!(firms(&view), vec!["A", "A", "C"]);
    }

    #[test]
    fn test_year_range_inclusive() {
        let ds = make_data();
        let spec = FilterSpec::default().with_year_range(Some(YearRange::new(2020, 2021)));
        assert_eq!(apply(&ds, &spec).len(), 2);
    }

    #[test]
    fn test_unknown_field_excludes_all() {
        let ds = make_data();
        let spec = FilterSpec::default().with_values("Shoe Size", [Value::text("9")]);
        assert!(apply(&ds, &spec).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let ds = make_data();
        let spec = FilterSpec::default()
            .with_values("Current Office", [Value::text("London"), Value::text("NYC")])
            .with_year_range(Some(YearRange::new(2015, 2025)));
        let once = apply(&ds, &spec);
        assert_eq!(apply(&once, &spec), once);
    }

    #[test]
    fn test_does_not_mutate_input() {
        let ds = make_data();
        let before = ds.clone();
        let spec = FilterSpec::default().with_values("Firm Name", [Value::text("Z")]);
        let view = apply(&ds, &spec);
        assert!(view.is_empty());
        assert_eq!(view.columns, ds.columns);
        assert_eq!(ds, before);
    }

    #[test]
    fn test_initial_selection() {
        let ds = normalize(RawTable::from_strings(
            &["Firm Name", "Current Office", "Year Joined"],
            &[
                &["C", "O1", "2001"],
                &["B", "O2", "2003"],
                &["A", "O3", ""],
                &["A", "O4", ""],
                &["A", "O5", ""],
                &["A", "O6", ""],
            ],
        ));
        let options = FilterOptions::from_dataset(&ds);
        let spec = FilterSpec::initial(&options, &SelectionLimits::default());
        assert_eq!(
            spec.categorical["Firm Name"],
            BTreeSet::from([Value::text("A"), Value::text("B")])
        );
        assert_eq!(spec.categorical["Current Office"].len(), 3);
        assert_eq!(spec.year_range, Some(YearRange::new(2001, 2003)));
    }

    #[test]
    fn test_initial_selection_few_offices() {
        let ds = make_data();
        let options = FilterOptions::from_dataset(&ds);
        let spec = FilterSpec::initial(&options, &SelectionLimits::default());
        assert_eq!(spec.categorical["Current Office"].len(), 3);
    }

    #[test]
    fn test_selection_limits_partial_config() {
        let limits: SelectionLimits = serde_json::from_str(r#"{"firms": 4}"#).unwrap();
        assert_eq!(limits.firms, 4);
        assert_eq!(limits.offices_all_up_to, 5);
    }
}
