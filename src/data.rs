use crate::error::IngestError;
use serde_json::Value as JsonValue;

/// An untyped cell as it arrives from an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }
}

/// Rows of named fields, before any schema is applied.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from plain strings, one `Cell::Text` per value.
    pub fn from_strings(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| Cell::text(*v)).collect())
                .collect(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Create a RawTable from a JSON Array of Objects
    pub fn from_json(value: &JsonValue) -> Result<Self, IngestError> {
        let array = value
            .as_array()
            .ok_or_else(|| IngestError::Json("input data must be a JSON array of objects".into()))?;

        // Headers are the union of keys, in first-seen order
        let mut headers: Vec<String> = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| IngestError::Json("items in array must be objects".into()))?;
            for key in obj.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| IngestError::Json("items in array must be objects".into()))?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(JsonValue::String(s)) => Cell::Text(s.clone()),
                    Some(JsonValue::Number(n)) => match n.as_f64() {
                        Some(f) => Cell::Number(f),
                        None => Cell::Text(n.to_string()),
                    },
                    Some(JsonValue::Bool(b)) => Cell::Text(b.to_string()),
                    Some(JsonValue::Null) | None => Cell::Null,
                    Some(_) => {
                        return Err(IngestError::Json(format!(
                            "unsupported value type for field '{}'",
                            header
                        )))
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_union_of_keys() {
        let value = json!([
            {"Firm Name": "A", "Year Joined": 2020},
            {"Firm Name": "B", "Current Office": "London"}
        ]);
        let table = RawTable::from_json(&value).unwrap();
        assert_eq!(table.headers, vec!["Firm Name", "Year Joined", "Current Office"]);
        assert_eq!(table.rows[0][1], Cell::Number(2020.0));
        assert_eq!(table.rows[0][2], Cell::Null);
        assert_eq!(table.rows[1][1], Cell::Null);
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let value = json!([
            {"Name": "x", "Firm Name": "A"},
            {"Year Joined": 2020, "Name": "y"}
        ]);
        let table = RawTable::from_json(&value).unwrap();
        assert_eq!(table.headers, vec!["Name", "Firm Name", "Year Joined"]);
        assert_eq!(table.rows[0][0], Cell::text("x"));
        assert_eq!(table.rows[1][1], Cell::Null);
    }

    #[test]
    fn test_from_json_empty_array() {
        let table = RawTable::from_json(&json!([])).unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_from_json_rejects_nested() {
        let value = json!([{"Firm Name": {"nested": true}}]);
        assert!(matches!(RawTable::from_json(&value), Err(IngestError::Json(_))));
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(RawTable::from_json(&json!({"a": 1})).is_err());
    }
}
