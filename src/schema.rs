//! Field schema and the normalizer that reconciles uploads against it.
//!
//! After [`normalize`] every record carries a value for every [`Field`], and
//! `Year Joined` is either an integer or [`Value::Missing`].

use crate::data::{Cell, RawTable};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// A typed cell of the normalized dataset.
///
/// Ordering is `Missing < Integer < Text`, with each variant ordered by its
/// natural ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// True when the string form is empty after trimming. `Missing` is blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Integer(_) => false,
            Value::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// The expected fields of a competitor roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirmName,
    Name,
    Title,
    HarmonizedTitle,
    YearJoined,
    CurrentOffice,
    TeamAssociated,
    HarmonizedTeam,
    AreaOfFocus,
    HarmonizedSubTeam,
    PriorExperience,
    MastersDegree,
    Undergraduate,
    CommitteeMemberships,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::FirmName,
        Field::Name,
        Field::Title,
        Field::HarmonizedTitle,
        Field::YearJoined,
        Field::CurrentOffice,
        Field::TeamAssociated,
        Field::HarmonizedTeam,
        Field::AreaOfFocus,
        Field::HarmonizedSubTeam,
        Field::PriorExperience,
        Field::MastersDegree,
        Field::Undergraduate,
        Field::CommitteeMemberships,
    ];

    /// Column header as it appears in uploaded files.
    pub fn name(self) -> &'static str {
        match self {
            Field::FirmName => "Firm Name",
            Field::Name => "Name",
            Field::Title => "Title",
            Field::HarmonizedTitle => "Harmonized title",
            Field::YearJoined => "Year Joined",
            Field::CurrentOffice => "Current Office",
            Field::TeamAssociated => "Team Associated",
            Field::HarmonizedTeam => "Harmonized team",
            Field::AreaOfFocus => "Investment sub-team / Area of focus",
            Field::HarmonizedSubTeam => "Harmonized sub-team",
            Field::PriorExperience => "Prior Experience",
            Field::MastersDegree => "Masters Degree",
            Field::Undergraduate => "Undergraduate",
            Field::CommitteeMemberships => "Committee memberships",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Value backfilled when the column is absent from the upload.
    pub fn default_value(self) -> Value {
        match self {
            Field::FirmName => Value::text("Unknown Firm"),
            Field::Name => Value::text("Unknown Name"),
            Field::HarmonizedTitle | Field::HarmonizedTeam | Field::HarmonizedSubTeam => {
                Value::text("Other")
            }
            Field::YearJoined => Value::Missing,
            Field::CurrentOffice => Value::text("Unknown Office"),
            Field::Title
            | Field::TeamAssociated
            | Field::AreaOfFocus
            | Field::PriorExperience
            | Field::MastersDegree
            | Field::Undergraduate
            | Field::CommitteeMemberships => Value::text(""),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub values: Vec<Value>,
}

/// An ordered sequence of records sharing one column list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of one column in record order; empty if the column is absent.
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let idx = self.column_index(name);
        self.records
            .iter()
            .filter_map(move |r| idx.and_then(|i| r.values.get(i)))
    }

    pub fn value<'a>(&self, record: &'a Record, name: &str) -> Option<&'a Value> {
        self.column_index(name).and_then(|i| record.values.get(i))
    }

    /// A dataset with the same columns holding the given records.
    pub fn with_records(&self, records: Vec<Record>) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }

    /// Compare two datasets by content, ignoring column order.
    pub fn content_eq(&self, other: &Dataset) -> bool {
        if self.len() != other.len() || self.columns.len() != other.columns.len() {
            return false;
        }
        self.columns.iter().all(|name| {
            other.has_column(name) && self.column(name).eq(other.column(name))
        })
    }
}

/// Normalize an upload against the field schema.
///
/// Missing expected columns are appended with their defaults, `Year Joined`
/// is coerced to an integer or `Missing`, and extra columns pass through.
pub fn normalize(raw: RawTable) -> Dataset {
    let RawTable { headers, rows } = raw;
    let year_idx = headers.iter().position(|h| h == Field::YearJoined.name());

    let missing: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|f| !headers.iter().any(|h| h == f.name()))
        .collect();

    let mut columns = headers;
    columns.extend(missing.iter().map(|f| f.name().to_string()));

    let mut coerced = 0usize;
    let records: Vec<Record> = rows
        .into_iter()
        .map(|row| {
            let mut values: Vec<Value> = row
                .into_iter()
                .enumerate()
                .map(|(i, cell)| {
                    if Some(i) == year_idx {
                        let year = coerce_year(&cell);
                        if year.is_missing() && !is_blank_cell(&cell) {
                            coerced += 1;
                        }
                        year
                    } else {
                        text_value(cell)
                    }
                })
                .collect();
            values.extend(missing.iter().map(|f| f.default_value()));
            Record { values }
        })
        .collect();

    if coerced > 0 {
        warn!(count = coerced, "non-numeric 'Year Joined' values coerced to no value");
    }
    info!(
        rows = records.len(),
        columns = columns.len(),
        backfilled = missing.len(),
        "normalized dataset"
    );

    Dataset { columns, records }
}

/// Coerce a raw cell to a year: integral part of any finite number, else `Missing`.
pub fn coerce_year(cell: &Cell) -> Value {
    let number = match cell {
        Cell::Null => None,
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
    };
    match number {
        Some(n) if n.is_finite() => Value::Integer(n.trunc() as i64),
        _ => Value::Missing,
    }
}

fn text_value(cell: Cell) -> Value {
    match cell {
        Cell::Null => Value::text(""),
        Cell::Text(s) => Value::Text(s),
        Cell::Number(n) => Value::Text(format_number(n)),
    }
}

fn is_blank_cell(cell: &Cell) -> bool {
    match cell {
        Cell::Null => true,
        Cell::Text(s) => s.trim().is_empty(),
        Cell::Number(_) => false,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
