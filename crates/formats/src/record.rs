//! A single parsed line from a JSON Lines source

use serde_json::Value;

/// A single record from a line-oriented dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The JSON data for this record
    pub data: Value,
    /// Source line number (1-based)
    pub source_line: usize,
}

impl Record {
    /// Create a new record
    pub fn new(data: Value, source_line: usize) -> Self {
        Self { data, source_line }
    }

    /// Field names in the order they appear, empty for non-objects
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.data
            .as_object()
            .into_iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_creation() {
        let data = json!({"email": "a@x.com", "total_orders": 1});
        let record = Record::new(data.clone(), 3);
        assert_eq!(record.data, data);
        assert_eq!(record.source_line, 3);
    }

    #[test]
    fn test_field_names_in_order() {
        let record = Record::new(json!({"b": 1, "a": 2}), 1);
        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, vec!["b", "a"]);

        let scalar = Record::new(json!(5), 1);
        assert_eq!(scalar.field_names().count(), 0);
    }
}
