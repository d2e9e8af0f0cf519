// Library exports for teamdash

pub mod aggregate;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod export;
pub mod filter;
pub mod guard;
pub mod options;
pub mod parser;
pub mod report;
pub mod schema;
pub mod session;

pub use filter::{FilterSpec, SelectionLimits, YearRange};
pub use schema::{Dataset, Field, Value};
pub use session::Session;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[serde(rename = "json")]
    #[default]
    Json,
    #[serde(rename = "text")]
    Text,
}

/// Settings loaded from a JSON config file; every field is optional.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DashboardOptions {
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default)]
    pub format: ReportFormat,
    #[serde(default)]
    pub selection: SelectionLimits,
}

fn default_preview_rows() -> usize { 200 }

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            preview_rows: 200,
            format: ReportFormat::Json,
            selection: SelectionLimits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let opts: DashboardOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, DashboardOptions::default());
    }

    #[test]
    fn test_options_override() {
        let opts: DashboardOptions =
            serde_json::from_str(r#"{"format": "text", "selection": {"offices_fallback": 1}}"#).unwrap();
        assert_eq!(opts.format, ReportFormat::Text);
        assert_eq!(opts.preview_rows, 200);
        assert_eq!(opts.selection.offices_fallback, 1);
        assert_eq!(opts.selection.firms, 2);
    }
}
