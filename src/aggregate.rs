//! Grouped counts and scalar KPIs over a filtered view.

use crate::schema::{Dataset, Field, Record, Value};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// One aggregate row: a distinct key tuple and how many records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub key: Vec<Value>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    pub dimensions: Vec<String>,
    pub groups: Vec<Group>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum of all group counts.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }
}

/// Count records per distinct tuple of `group_fields`, ordered by key.
///
/// Takes one to three grouping fields. Every record counts once, so the group
/// counts always sum to `view.len()`; `count_field` names the identifier
/// column being counted. Absent group columns read as `Missing`.
pub fn aggregate(view: &Dataset, group_fields: &[&str], count_field: &str) -> AggregationResult {
    debug_assert!(
        (1..=3).contains(&group_fields.len()),
        "aggregate takes 1 to 3 grouping fields, got {}",
        group_fields.len()
    );
    let indices: Vec<Option<usize>> = group_fields.iter().map(|f| view.column_index(f)).collect();

    let mut counts: BTreeMap<Vec<Value>, usize> = BTreeMap::new();
    for record in &view.records {
        let key: Vec<Value> = indices
            .iter()
            .map(|idx| cell(record, *idx).clone())
            .collect();
        *counts.entry(key).or_default() += 1;
    }

    let groups: Vec<Group> = counts
        .into_iter()
        .map(|(key, count)| Group { key, count })
        .collect();
    debug!(dimensions = ?group_fields, count_field, groups = groups.len(), "aggregated view");

    AggregationResult {
        dimensions: group_fields.iter().map(|f| f.to_string()).collect(),
        groups,
    }
}

fn cell(record: &Record, idx: Option<usize>) -> &Value {
    idx.and_then(|i| record.values.get(i)).unwrap_or(&Value::Missing)
}

/// Reshape `value_fields` from wide to long.
///
/// Output columns are `id_fields`, then `var_name` holding the source column
/// name, then `value_name` holding its value. Rows are ordered by value field,
/// then by input record.
pub fn melt(
    view: &Dataset,
    id_fields: &[&str],
    value_fields: &[&str],
    var_name: &str,
    value_name: &str,
) -> Dataset {
    let id_indices: Vec<Option<usize>> = id_fields.iter().map(|f| view.column_index(f)).collect();

    let mut columns: Vec<String> = id_fields.iter().map(|f| f.to_string()).collect();
    columns.push(var_name.to_string());
    columns.push(value_name.to_string());

    let mut records = Vec::with_capacity(view.len() * value_fields.len());
    for field in value_fields {
        let value_idx = view.column_index(field);
        for record in &view.records {
            let mut values: Vec<Value> = id_indices
                .iter()
                .map(|idx| cell(record, *idx).clone())
                .collect();
            values.push(Value::text(*field));
            values.push(cell(record, value_idx).clone());
            records.push(Record { values });
        }
    }

    Dataset::new(columns, records)
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_members: usize,
    pub average_year_joined: Option<f64>,
    pub offices: usize,
    pub titles: usize,
}

impl Kpis {
    pub fn compute(view: &Dataset) -> Self {
        Self {
            total_members: distinct_count(view, Field::Name.name()),
            average_year_joined: mean_year(view),
            offices: distinct_count(view, Field::CurrentOffice.name()),
            titles: distinct_count(view, Field::HarmonizedTitle.name()),
        }
    }

    /// Whole-year display of the average, or "N/A" without year data.
    pub fn average_year_display(&self) -> String {
        match self.average_year_joined {
            Some(avg) => format!("{}", avg.trunc() as i64),
            None => "N/A".to_string(),
        }
    }
}

/// Distinct values of `field`, ignoring missing and blank ones.
pub fn distinct_count(view: &Dataset, field: &str) -> usize {
    view.column(field)
        .filter(|v| !v.is_blank())
        .collect::<HashSet<_>>()
        .len()
}

/// Mean of the present `Year Joined` values.
pub fn mean_year(view: &Dataset) -> Option<f64> {
    let (sum, n) = view
        .column(Field::YearJoined.name())
        .filter_map(Value::as_integer)
        .fold((0f64, 0usize), |(sum, n), year| (sum + year as f64, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawTable;
    use crate::schema::normalize;

    fn make_data() -> Dataset {
        normalize(RawTable::from_strings(
            &["Firm Name", "Name", "Year Joined", "Current Office", "Masters Degree"],
            &[
                &["A", "Ann", "2020", "London", "MBA"],
                &["B", "Bob", "2021", "NYC", ""],
                &["A", "Cat", "2020", "London", "MSc"],
                &["A", "Ann", "", "", "MBA"],
            ],
        ))
    }

    #[test]
    fn test_single_dimension() {
        let result = aggregate(&make_data(), &["Firm Name"], "Name");
        assert_eq!(result.dimensions, vec!["Firm Name"]);
        assert_eq!(
            result.groups,
            vec![
                Group { key: vec![Value::text("A")], count: 3 },
                Group { key: vec![Value::text("B")], count: 1 },
            ]
        );
    }

    #[test]
    fn test_two_dimensions_total() {
        let ds = make_data();
        let result = aggregate(&ds, &["Year Joined", "Firm Name"], "Name");
        assert_eq!(result.total(), ds.len());
        // Missing year sorts first
        assert_eq!(result.groups[0].key, vec![Value::Missing, Value::text("A")]);
        assert_eq!(
            result.groups[1],
            Group { key: vec![Value::Integer(2020), Value::text("A")], count: 2 }
        );
    }

    #[test]
    fn test_sparse_count_field_still_counts_rows() {
        let ds = normalize(RawTable::from_strings(
            &["Firm Name", "Name", "Year Joined"],
            &[&["A", "x", "2020"], &["A", "y", ""], &["B", "z", ""]],
        ));
        let by_year = aggregate(&ds, &["Firm Name"], "Year Joined");
        assert_eq!(by_year.total(), ds.len());
        assert_eq!(by_year.groups[1], Group { key: vec![Value::text("B")], count: 1 });

        let absent = aggregate(&ds, &["Firm Name"], "Shoe Size");
        assert_eq!(absent.total(), ds.len());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "1 to 3 grouping fields")]
    fn test_rejects_zero_dimensions() {
        aggregate(&make_data(), &[], "Name");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "1 to 3 grouping fields")]
    fn test_rejects_four_dimensions() {
        aggregate(
            &make_data(),
            &["Firm Name", "Name", "Current Office", "Masters Degree"],
            "Name",
        );
    }

    #[test]
    fn test_three_dimensions() {
        let ds = make_data();
        let result = aggregate(&ds, &["Firm Name", "Current Office", "Masters Degree"], "Name");
        assert_eq!(result.total(), 4);
        assert_eq!(result.groups.len(), 4);
    }

    #[test]
    fn test_empty_view() {
        let ds = make_data().with_records(vec![]);
        let result = aggregate(&ds, &["Firm Name"], "Name");
        assert!(result.is_empty());
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_melt() {
        let ds = make_data();
        let long = melt(&ds, &["Firm Name"], &["Masters Degree", "Current Office"], "Degree Type", "Degree");
        assert_eq!(long.columns, vec!["Firm Name", "Degree Type", "Degree"]);
        assert_eq!(long.len(), 8);
        assert_eq!(
            long.records[0].values,
            vec![Value::text("A"), Value::text("Masters Degree"), Value::text("MBA")]
        );
        assert_eq!(long.records[4].values[1], Value::text("Current Office"));
    }

    #[test]
    fn test_kpis() {
        let kpis = Kpis::compute(&make_data());
        assert_eq!(kpis.total_members, 3);
        let avg = kpis.average_year_joined.unwrap();
        assert!((avg - 6061.0 / 3.0).abs() < 1e-9);
        assert_eq!(kpis.average_year_display(), "2020");
        assert_eq!(kpis.offices, 2);
        assert_eq!(kpis.titles, 1);
    }

    #[test]
    fn test_kpis_empty_view() {
        let kpis = Kpis::compute(&make_data().with_records(vec![]));
        assert_eq!(
            kpis,
            Kpis { total_members: 0, average_year_joined: None, offices: 0, titles: 0 }
        );
        assert_eq!(kpis.average_year_display(), "N/A");
    }
}
