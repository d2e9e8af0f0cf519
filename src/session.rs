//! The working copy of one upload and every operation the dashboard runs on it.

use crate::aggregate::{aggregate, AggregationResult, Kpis};
use crate::csv_reader::read_csv;
use crate::data::RawTable;
use crate::error::{ExportError, FilterError, IngestError};
use crate::export::to_csv_bytes;
use crate::filter::{apply, FilterSpec, SelectionLimits};
use crate::guard::is_plottable;
use crate::options::{resolve, FilterOptions};
use crate::parser::parse_filter;
use crate::report::{self, Dashboard};
use crate::schema::{normalize, Dataset, Value};
use std::io::Read;
use tracing::info;

/// Session-scoped context: the normalized dataset plus its filter options.
///
/// Created once per upload. Every filter change derives a fresh view; nothing
/// derived is cached.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Dataset,
    options: FilterOptions,
}

impl Session {
    pub fn new(raw: RawTable) -> Self {
        let dataset = normalize(raw);
        let options = FilterOptions::from_dataset(&dataset);
        info!(
            rows = dataset.len(),
            firms = options.firms.len(),
            offices = options.offices.len(),
            has_years = options.years.is_some(),
            "session ready"
        );
        Self { dataset, options }
    }

    /// Ingest a CSV upload. Unparseable input yields no session at all.
    pub fn from_csv<R: Read>(input: R) -> Result<Self, IngestError> {
        Ok(Self::new(read_csv(input)?))
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Self, IngestError> {
        Ok(Self::new(RawTable::from_json(value)?))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn has_years(&self) -> bool {
        self.options.years.is_some()
    }

    pub fn options_for(&self, field: &str, fallback: Option<Value>) -> Vec<Value> {
        resolve(&self.dataset, field, fallback)
    }

    /// No categorical selection; the full year range when year data exists.
    pub fn default_filter(&self) -> FilterSpec {
        FilterSpec::for_options(&self.options)
    }

    pub fn initial_filter(&self, limits: &SelectionLimits) -> FilterSpec {
        FilterSpec::initial(&self.options, limits)
    }

    /// Compile a filter expression on top of `base`.
    pub fn parse_filter(&self, expr: &str, base: FilterSpec) -> Result<FilterSpec, FilterError> {
        parse_filter(expr, &self.dataset, base)
    }

    pub fn filter(&self, spec: &FilterSpec) -> Dataset {
        apply(&self.dataset, spec)
    }

    /// Grouped counts over the filtered view, or `None` when the first
    /// grouping field has no plottable data in that view.
    pub fn aggregate(
        &self,
        spec: &FilterSpec,
        group_fields: &[&str],
        count_field: &str,
    ) -> Option<AggregationResult> {
        let view = self.filter(spec);
        let first = group_fields.first()?;
        is_plottable(&view, first).then(|| aggregate(&view, group_fields, count_field))
    }

    pub fn kpis(&self, spec: &FilterSpec) -> Kpis {
        Kpis::compute(&self.filter(spec))
    }

    pub fn dashboard(&self, spec: &FilterSpec, preview_rows: usize) -> Dashboard {
        report::build(&self.filter(spec), self.has_years(), preview_rows)
    }

    pub fn export(&self, spec: &FilterSpec) -> Result<Vec<u8>, ExportError> {
        to_csv_bytes(&self.filter(spec))
    }
}
