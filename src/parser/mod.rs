// Filter expression language used by the command line

pub mod ast;
pub mod expr;
pub mod lexer;

pub use ast::{Clause, FilterExpr, Literal};
pub use expr::parse_filter_expr;

use crate::data::Cell;
use crate::error::FilterError;
use crate::filter::{FilterSpec, YearRange};
use crate::schema::{coerce_year, Dataset, Field, Value};

/// Parse `input` into a [`FilterExpr`], reporting where parsing stopped.
pub fn parse(input: &str) -> Result<FilterExpr, FilterError> {
    match parse_filter_expr(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(FilterError::Parse(e.input.trim().to_string()))
        }
        Err(nom::Err::Incomplete(_)) => Err(FilterError::Parse(input.trim().to_string())),
    }
}

/// Layer the clauses of `expr` over `base`, checking fields against `dataset`.
///
/// `in` clauses on the same field union; `between` clauses replace the base
/// year range and intersect with each other.
pub fn compile(expr: &FilterExpr, dataset: &Dataset, base: FilterSpec) -> Result<FilterSpec, FilterError> {
    let year_field = Field::YearJoined.name();
    let mut spec = base;
    let mut range: Option<YearRange> = None;

    for clause in &expr.clauses {
        match clause {
            Clause::In { field, values } => {
                if !dataset.has_column(field) {
                    return Err(FilterError::UnknownField(field.clone()));
                }
                let typed = values.iter().map(|lit| {
                    if field == year_field {
                        coerce_year(&Cell::text(lit.to_string()))
                    } else {
                        Value::text(lit.to_string())
                    }
                });
                spec = spec.with_values(field, typed);
            }
            Clause::Between { field, lower, upper } => {
                if !dataset.has_column(field) {
                    return Err(FilterError::UnknownField(field.clone()));
                }
                if field != year_field {
                    return Err(FilterError::UnsupportedRange(field.clone()));
                }
                range = Some(match range {
                    None => YearRange::new(*lower, *upper),
                    Some(r) => YearRange::new(r.lower.max(*lower), r.upper.min(*upper)),
                });
            }
        }
    }

    if range.is_some() {
        spec = spec.with_year_range(range);
    }
    Ok(spec)
}

/// Parse and compile in one step.
pub fn parse_filter(input: &str, dataset: &Dataset, base: FilterSpec) -> Result<FilterSpec, FilterError> {
    compile(&parse(input)?, dataset, base)
}
