use crate::schema::Dataset;

/// Whether `field` carries enough real data in `view` to be aggregated.
///
/// Requires the column to exist, at least one non-missing value, and at least
/// one value that is not blank after trimming.
pub fn is_plottable(view: &Dataset, field: &str) -> bool {
    view.has_column(field)
        && view.column(field).any(|v| !v.is_missing())
        && view.column(field).any(|v| !v.is_blank())
}
