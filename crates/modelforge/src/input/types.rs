//! Wire types for the structural input and sampled statistics.

use serde::{Deserialize, Serialize};

/// Structural table/field specification, as received from the parser stage.
///
/// Immutable once received; enrichment never mutates the original input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage1Input {
    /// Format version of the input document.
    pub version: String,
    /// Where the specification came from (e.g. an app id or file path).
    pub source: String,
    /// When the upstream parser produced this document.
    pub parsed_at: String,
    /// Tables in the model.
    pub tables: Vec<Stage1Table>,
    /// Explicit relationship hints between tables.
    #[serde(default)]
    pub relationship_hints: Vec<RelationshipHint>,
}

/// A table in the structural specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage1Table {
    /// Logical table name.
    pub name: String,
    /// Source identifier (file or dataset name).
    #[serde(default)]
    pub source_name: String,
    /// Declared fields.
    pub fields: Vec<Stage1Field>,
}

/// A field in the structural specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage1Field {
    /// Field name.
    pub name: String,
    /// Declared type, if the spec author provided one.
    #[serde(rename = "type", default)]
    pub declared_type: Option<String>,
}

/// An explicit relationship hint between two `Table.Field` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipHint {
    /// Source endpoint, formatted `Table.Field`.
    pub from: String,
    /// Target endpoint, formatted `Table.Field`.
    pub to: String,
    /// Relationship type (e.g. `many-to-one`).
    #[serde(rename = "type", default)]
    pub relation_type: Option<String>,
}

/// Sampled statistics for one table, obtained out-of-band from QVD headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QvdSampleData {
    /// Table name; matched case-insensitively against the structural input.
    pub table_name: String,
    /// Observed row count.
    #[serde(default)]
    pub row_count: u64,
    /// Per-field samples.
    #[serde(default)]
    pub fields: Vec<QvdFieldSample>,
}

/// Sampled statistics for one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QvdFieldSample {
    /// Field name.
    pub name: String,
    /// Observed type; overrides the declared type when present.
    #[serde(rename = "type", default)]
    pub sampled_type: Option<String>,
    /// Number of distinct values observed.
    #[serde(default)]
    pub cardinality: u64,
    /// Percentage of null values (0-100).
    #[serde(default)]
    pub null_percent: f64,
    /// Up to a handful of representative values.
    #[serde(default)]
    pub sample_values: Vec<String>,
    /// Minimum observed value, as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    /// Maximum observed value, as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_stage1_input() {
        let json = r#"{
            "version": "1.0",
            "source": "app-123",
            "parsed_at": "2026-01-15T10:00:00Z",
            "tables": [
                {"name": "Orders", "source_name": "orders.qvd",
                 "fields": [{"name": "OrderID", "type": "integer"}, {"name": "Amount"}]}
            ],
            "relationship_hints": [
                {"from": "Orders.CustomerID", "to": "Customers.CustomerID", "type": "many-to-one"}
            ]
        }"#;

        let input: Stage1Input = serde_json::from_str(json).unwrap();
        assert_eq!(input.tables.len(), 1);
        assert_eq!(input.tables[0].fields[0].declared_type.as_deref(), Some("integer"));
        assert!(input.tables[0].fields[1].declared_type.is_none());
        assert_eq!(input.relationship_hints[0].relation_type.as_deref(), Some("many-to-one"));
    }

    #[test]
    fn test_deserialize_qvd_sample_defaults() {
        let json = r#"{"table_name": "Orders", "fields": [{"name": "OrderID"}]}"#;
        let sample: QvdSampleData = serde_json::from_str(json).unwrap();
        assert_eq!(sample.row_count, 0);
        assert_eq!(sample.fields[0].cardinality, 0);
        assert_eq!(sample.fields[0].null_percent, 0.0);
        assert!(sample.fields[0].min_value.is_none());
    }
}
