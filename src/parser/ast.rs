// Abstract Syntax Tree for the filter expression language

use std::fmt;

/// Clauses joined by `&` / `and`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterExpr {
    pub clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// field in ["a", "b"]
    In { field: String, values: Vec<Literal> },
    /// field between 2010 and 2020
    Between { field: String, lower: i64, upper: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    /// Bare digits, kept as written so `007` stays distinct from `7`
    Number(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => f.write_str(s),
            Literal::Number(s) => f.write_str(s),
        }
    }
}
