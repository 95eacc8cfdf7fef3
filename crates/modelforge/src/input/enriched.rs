//! Enriched model specification produced by the input processor.

use serde::{Deserialize, Serialize};

use crate::analysis::{ModelType, TableClassification};

/// Semantic role of a field in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Key candidate (primary or foreign).
    Key,
    /// Date or timestamp field.
    Date,
    /// Numeric measure.
    Measure,
    /// Descriptive attribute.
    Attribute,
}

/// A field enriched with sampled statistics and detection flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedField {
    /// Field name.
    pub name: String,
    /// Effective type: sampled type when present, declared type otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Number of distinct values; 0 when no sample exists.
    pub cardinality: u64,
    /// Percentage of null values (0-100); 0 when no sample exists.
    pub null_percent: f64,
    /// Whether this field is a plausible key.
    pub is_key_candidate: bool,
    /// Whether this field holds date/timestamp values.
    pub is_date_field: bool,
    /// Representative values from the sample.
    #[serde(default)]
    pub sample_values: Vec<String>,
    /// Semantic role derived from the detection flags and type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<SemanticType>,
    /// Minimum observed value, when sampled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    /// Maximum observed value, when sampled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
}

impl EnrichedField {
    /// Whether the effective type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.field_type.as_deref().map(str::to_lowercase).as_deref(),
            Some("integer" | "int" | "float" | "double" | "decimal" | "number" | "numeric" | "money")
        )
    }

    /// Whether the effective type is a date or timestamp type.
    pub fn has_temporal_type(&self) -> bool {
        matches!(
            self.field_type.as_deref().map(str::to_lowercase).as_deref(),
            Some("date" | "datetime" | "timestamp")
        )
    }
}

/// A table enriched with row counts and (later) a classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTable {
    /// Logical table name.
    pub name: String,
    /// Source identifier from the structural input.
    pub source_name: String,
    /// Enriched fields.
    pub fields: Vec<EnrichedField>,
    /// Observed row count; 0 when no sample exists.
    pub row_count: u64,
    /// Classification assigned by the analyzer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<TableClassification>,
    /// Confidence in the classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_confidence: Option<f64>,
}

impl EnrichedTable {
    /// Look up a field by name, case-insensitively.
    pub fn field(&self, name: &str) -> Option<&EnrichedField> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// The first key-candidate field, if any.
    pub fn key_field(&self) -> Option<&EnrichedField> {
        self.fields.iter().find(|f| f.is_key_candidate)
    }
}

/// A relationship between two tables, validated or merely hinted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRelationship {
    pub from_table: String,
    pub from_field: String,
    pub to_table: String,
    pub to_field: String,
    /// Relationship type (e.g. `many-to-one`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_type: Option<String>,
    /// Cardinality of the source field, when sampled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_cardinality: Option<u64>,
    /// Cardinality of the target field, when sampled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_cardinality: Option<u64>,
    /// Whether both endpoints exist in the table set.
    pub validated: bool,
    /// Confidence for inferred relationships.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Whether this relationship was inferred rather than hinted.
    #[serde(default)]
    pub inferred: bool,
}

/// Reference to a date field discovered during enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFieldRef {
    /// Table the field lives in.
    pub table: String,
    /// Field name.
    pub field: String,
}

/// The full enriched model graph.
///
/// Created once per session by the input processor; read-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedModelSpec {
    /// Format version carried over from the input.
    pub version: String,
    /// Source identifier carried over from the input.
    pub source: String,
    /// Enriched tables, in input order.
    pub tables: Vec<EnrichedTable>,
    /// Relationships: validated hints, invalid-but-kept hints, and inferences.
    pub relationships: Vec<EnrichedRelationship>,
    /// Date fields collected across all tables, for calendar generation.
    pub date_fields: Vec<DateFieldRef>,
    /// Model type recommended by the analyzer, once analysis has run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_model: Option<ModelType>,
    /// Confidence in the recommendation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_confidence: Option<f64>,
}

impl EnrichedModelSpec {
    /// Look up a table by name, case-insensitively.
    pub fn table(&self, name: &str) -> Option<&EnrichedTable> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: Option<&str>) -> EnrichedField {
        EnrichedField {
            name: name.to_string(),
            field_type: field_type.map(String::from),
            cardinality: 0,
            null_percent: 0.0,
            is_key_candidate: false,
            is_date_field: false,
            sample_values: Vec::new(),
            semantic_type: None,
            min_value: None,
            max_value: None,
        }
    }

    #[test]
    fn test_numeric_type_detection() {
        assert!(field("Amount", Some("decimal")).is_numeric());
        assert!(field("Qty", Some("Integer")).is_numeric());
        assert!(!field("Name", Some("string")).is_numeric());
        assert!(!field("Name", None).is_numeric());
    }

    #[test]
    fn test_temporal_type_detection() {
        assert!(field("Created", Some("DateTime")).has_temporal_type());
        assert!(!field("Created", Some("string")).has_temporal_type());
    }

    #[test]
    fn test_case_insensitive_field_lookup() {
        let table = EnrichedTable {
            name: "Orders".to_string(),
            source_name: String::new(),
            fields: vec![field("OrderID", None)],
            row_count: 0,
            classification: None,
            classification_confidence: None,
        };
        assert!(table.field("orderid").is_some());
        assert!(table.field("missing").is_none());
    }
}
