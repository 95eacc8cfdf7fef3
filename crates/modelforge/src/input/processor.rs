//! Input enrichment: merge structural input with sampled statistics.

use once_cell::sync::Lazy;
use regex::Regex;

use super::enriched::{
    DateFieldRef, EnrichedField, EnrichedModelSpec, EnrichedRelationship, EnrichedTable,
    SemanticType,
};
use super::types::{QvdFieldSample, QvdSampleData, Stage1Input, Stage1Table};

/// Uniqueness ratio above which a field qualifies as a key candidate.
///
/// Hand-tuned cutoff preserved from the original behavior; tests depend on it.
pub const KEY_UNIQUENESS_RATIO: f64 = 0.9;

/// Confidence assigned to inferred (non-hinted) relationships.
pub const INFERRED_RELATIONSHIP_CONFIDENCE: f64 = 0.7;

static KEY_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)((id|key|code)$|^(pk|fk)_)").unwrap());

static DATE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(date$|^date_|_at$|timestamp)").unwrap());

static FK_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i:_id)$|Id$").unwrap());

/// Merges a structural specification with sampled statistics into an
/// enriched model specification.
///
/// Pure: same input and samples always yield the same spec. Missing samples
/// degrade confidence downstream but never block processing.
pub struct InputProcessor;

impl InputProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Enrich a validated input with sampled statistics.
    pub fn process(&self, input: &Stage1Input, samples: &[QvdSampleData]) -> EnrichedModelSpec {
        let tables: Vec<EnrichedTable> = input
            .tables
            .iter()
            .map(|table| self.enrich_table(table, samples))
            .collect();

        let date_fields = collect_date_fields(&tables);

        let mut relationships = self.process_hints(input, &tables);
        let inferred = self.infer_relationships(&tables, &relationships);
        relationships.extend(inferred);

        EnrichedModelSpec {
            version: input.version.clone(),
            source: input.source.clone(),
            tables,
            relationships,
            date_fields,
            recommended_model: None,
            recommendation_confidence: None,
        }
    }

    fn enrich_table(&self, table: &Stage1Table, samples: &[QvdSampleData]) -> EnrichedTable {
        let sample = samples
            .iter()
            .find(|s| s.table_name.eq_ignore_ascii_case(&table.name));
        let row_count = sample.map(|s| s.row_count).unwrap_or(0);

        let fields = table
            .fields
            .iter()
            .map(|field| {
                let field_sample = sample.and_then(|s| {
                    s.fields
                        .iter()
                        .find(|fs| fs.name.eq_ignore_ascii_case(&field.name))
                });
                self.enrich_field(&field.name, field.declared_type.as_deref(), field_sample, row_count)
            })
            .collect();

        EnrichedTable {
            name: table.name.clone(),
            source_name: table.source_name.clone(),
            fields,
            row_count,
            classification: None,
            classification_confidence: None,
        }
    }

    fn enrich_field(
        &self,
        name: &str,
        declared_type: Option<&str>,
        sample: Option<&QvdFieldSample>,
        row_count: u64,
    ) -> EnrichedField {
        // Sampled type reflects observed data; declared type may be stale.
        let field_type = sample
            .and_then(|s| s.sampled_type.clone())
            .or_else(|| declared_type.map(String::from));

        let cardinality = sample.map(|s| s.cardinality).unwrap_or(0);
        let null_percent = sample.map(|s| s.null_percent).unwrap_or(0.0);

        let mut field = EnrichedField {
            name: name.to_string(),
            field_type,
            cardinality,
            null_percent,
            is_key_candidate: false,
            is_date_field: false,
            sample_values: sample.map(|s| s.sample_values.clone()).unwrap_or_default(),
            semantic_type: None,
            min_value: sample.and_then(|s| s.min_value.clone()),
            max_value: sample.and_then(|s| s.max_value.clone()),
        };

        field.is_key_candidate = detect_key_candidate(&field, row_count);
        field.is_date_field = detect_date_field(&field);
        field.semantic_type = Some(semantic_type_for(&field));

        field
    }

    /// Validate explicit hints against the enriched table set.
    ///
    /// Invalid hints are kept but flagged `validated: false`; the analyzer
    /// still needs to see them to warn about broken references.
    fn process_hints(
        &self,
        input: &Stage1Input,
        tables: &[EnrichedTable],
    ) -> Vec<EnrichedRelationship> {
        input
            .relationship_hints
            .iter()
            .map(|hint| {
                let (from_table, from_field) = split_endpoint(&hint.from);
                let (to_table, to_field) = split_endpoint(&hint.to);

                let from = lookup_field(tables, &from_table, &from_field);
                let to = lookup_field(tables, &to_table, &to_field);
                let validated = from.is_some() && to.is_some();

                EnrichedRelationship {
                    from_table,
                    from_field,
                    to_table,
                    to_field,
                    relation_type: hint.relation_type.clone(),
                    from_cardinality: from.map(|f| f.cardinality).filter(|&c| c > 0),
                    to_cardinality: to.map(|f| f.cardinality).filter(|&c| c > 0),
                    validated,
                    confidence: None,
                    inferred: false,
                }
            })
            .collect()
    }

    /// Discover probable foreign-key relationships from field names.
    ///
    /// A discovery aid, not authoritative: inferences augment explicit
    /// hints but never override or duplicate them.
    fn infer_relationships(
        &self,
        tables: &[EnrichedTable],
        existing: &[EnrichedRelationship],
    ) -> Vec<EnrichedRelationship> {
        let mut inferred = Vec::new();

        for table in tables {
            for field in &table.fields {
                if !FK_NAME_PATTERN.is_match(&field.name) {
                    continue;
                }

                let Some((target, target_field)) = find_fk_target(tables, table, &field.name)
                else {
                    continue;
                };

                let already_known = existing.iter().chain(inferred.iter()).any(|r| {
                    r.from_table.eq_ignore_ascii_case(&table.name)
                        && r.from_field.eq_ignore_ascii_case(&field.name)
                        && r.to_table.eq_ignore_ascii_case(&target.name)
                });
                if already_known {
                    continue;
                }

                inferred.push(EnrichedRelationship {
                    from_table: table.name.clone(),
                    from_field: field.name.clone(),
                    to_table: target.name.clone(),
                    to_field: target_field.name.clone(),
                    relation_type: Some("many-to-one".to_string()),
                    from_cardinality: Some(field.cardinality).filter(|&c| c > 0),
                    to_cardinality: Some(target_field.cardinality).filter(|&c| c > 0),
                    validated: true,
                    confidence: Some(INFERRED_RELATIONSHIP_CONFIDENCE),
                    inferred: true,
                });
            }
        }

        inferred
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide whether a field is a plausible key.
///
/// Nullable fields are never keys, regardless of other signals. Otherwise a
/// key-shaped name or a high uniqueness ratio each suffice on their own.
pub fn detect_key_candidate(field: &EnrichedField, row_count: u64) -> bool {
    if field.null_percent > 0.0 {
        return false;
    }

    if KEY_NAME_PATTERN.is_match(&field.name) {
        return true;
    }

    // Guards against row_count = 0, which yields false.
    row_count > 0 && field.cardinality as f64 / row_count as f64 >= KEY_UNIQUENESS_RATIO
}

/// Decide whether a field holds date/timestamp values.
pub fn detect_date_field(field: &EnrichedField) -> bool {
    DATE_NAME_PATTERN.is_match(&field.name) || field.has_temporal_type()
}

fn semantic_type_for(field: &EnrichedField) -> SemanticType {
    if field.is_key_candidate {
        SemanticType::Key
    } else if field.is_date_field {
        SemanticType::Date
    } else if field.is_numeric() {
        SemanticType::Measure
    } else {
        SemanticType::Attribute
    }
}

fn collect_date_fields(tables: &[EnrichedTable]) -> Vec<DateFieldRef> {
    let mut refs = Vec::new();
    for table in tables {
        for field in &table.fields {
            if field.is_date_field {
                refs.push(DateFieldRef {
                    table: table.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }
    refs
}

/// Split a `Table.Field` endpoint. A missing dot leaves the field empty,
/// which can never validate.
fn split_endpoint(endpoint: &str) -> (String, String) {
    match endpoint.split_once('.') {
        Some((table, field)) => (table.to_string(), field.to_string()),
        None => (endpoint.to_string(), String::new()),
    }
}

fn lookup_field<'a>(
    tables: &'a [EnrichedTable],
    table: &str,
    field: &str,
) -> Option<&'a EnrichedField> {
    tables
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(table))?
        .field(field)
}

/// Find the table a FK-shaped field probably points at: a *different* table
/// whose name matches the field's base name with the suffix stripped
/// (`customer_id` points at `Customers`). Requiring the name match keeps the
/// inferred edge directional; matching on field name alone would also produce
/// the spurious reverse edge from the primary-key side.
fn find_fk_target<'a>(
    tables: &'a [EnrichedTable],
    source: &EnrichedTable,
    field_name: &str,
) -> Option<(&'a EnrichedTable, &'a EnrichedField)> {
    let base = strip_fk_suffix(field_name).to_lowercase();
    if base.is_empty() {
        return None;
    }

    for table in tables {
        if table.name.eq_ignore_ascii_case(&source.name) {
            continue;
        }

        let table_base = table.name.to_lowercase();
        let singular = table_base.strip_suffix('s').unwrap_or(&table_base);
        if table_base != base && singular != base {
            continue;
        }

        // Prefer the identically-named field; fall back to the table's key.
        if let Some(f) = table.field(field_name) {
            if f.is_key_candidate {
                return Some((table, f));
            }
        }
        if let Some(key) = table.key_field() {
            return Some((table, key));
        }
    }

    None
}

fn strip_fk_suffix(name: &str) -> &str {
    if let Some(base) = name
        .strip_suffix("_id")
        .or_else(|| name.strip_suffix("_ID"))
        .or_else(|| name.strip_suffix("_Id"))
    {
        base
    } else if let Some(base) = name.strip_suffix("Id").or_else(|| name.strip_suffix("ID")) {
        base
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::types::RelationshipHint;
    use serde_json::json;

    fn make_field(name: &str) -> EnrichedField {
        EnrichedField {
            name: name.to_string(),
            field_type: None,
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

    fn make_input(tables: Vec<(&str, Vec<&str>)>, hints: Vec<(&str, &str)>) -> Stage1Input {
        Stage1Input {
            version: "1.0".to_string(),
            source: "test".to_string(),
            parsed_at: "2026-01-15T10:00:00Z".to_string(),
            tables: tables
                .into_iter()
                .map(|(name, fields)| Stage1Table {
                    name: name.to_string(),
                    source_name: format!("{}.qvd", name.to_lowercase()),
                    fields: fields
                        .into_iter()
                        .map(|f| super::super::types::Stage1Field {
                            name: f.to_string(),
                            declared_type: None,
                        })
                        .collect(),
                })
                .collect(),
            relationship_hints: hints
                .into_iter()
                .map(|(from, to)| RelationshipHint {
                    from: from.to_string(),
                    to: to.to_string(),
                    relation_type: Some("many-to-one".to_string()),
                })
                .collect(),
        }
    }

    fn make_sample(table: &str, row_count: u64, fields: Vec<(&str, u64, f64)>) -> QvdSampleData {
        serde_json::from_value(json!({
            "table_name": table,
            "row_count": row_count,
            "fields": fields.iter().map(|(name, card, nulls)| json!({
                "name": name, "cardinality": card, "null_percent": nulls
            })).collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    #[test]
    fn test_nullable_field_is_never_a_key() {
        let mut field = make_field("CustomerID");
        field.null_percent = 0.5;
        field.cardinality = 1000;
        assert!(!detect_key_candidate(&field, 1000));
    }

    #[test]
    fn test_key_detection_by_name() {
        for name in ["CustomerID", "order_id", "ProductKey", "CountryCode", "pk_row", "FK_Item"] {
            assert!(detect_key_candidate(&make_field(name), 0), "{}", name);
        }
        assert!(!detect_key_candidate(&make_field("Description"), 0));
    }

    #[test]
    fn test_key_detection_by_uniqueness() {
        let mut field = make_field("serial");
        field.cardinality = 95;
        assert!(detect_key_candidate(&field, 100));

        field.cardinality = 50;
        assert!(!detect_key_candidate(&field, 100));

        // row_count = 0 must not divide by zero or qualify
        field.cardinality = 50;
        assert!(!detect_key_candidate(&field, 0));
    }

    #[test]
    fn test_date_detection_by_name_and_type() {
        assert!(detect_date_field(&make_field("OrderDate")));
        assert!(detect_date_field(&make_field("date_shipped")));
        assert!(detect_date_field(&make_field("created_at")));
        assert!(detect_date_field(&make_field("EventTimestamp")));
        assert!(!detect_date_field(&make_field("Amount")));

        let mut typed = make_field("when");
        typed.field_type = Some("datetime".to_string());
        assert!(detect_date_field(&typed));
    }

    #[test]
    fn test_process_preserves_table_count_and_defaults() {
        let input = make_input(
            vec![("Orders", vec!["OrderID", "Amount"]), ("Customers", vec!["CustomerID"])],
            vec![],
        );
        let spec = InputProcessor::new().process(&input, &[]);

        assert_eq!(spec.tables.len(), 2);
        assert_eq!(spec.tables[0].row_count, 0);
        assert_eq!(spec.tables[0].fields[1].cardinality, 0);
        assert_eq!(spec.tables[0].fields[1].null_percent, 0.0);
    }

    #[test]
    fn test_sample_matching_is_case_insensitive() {
        let input = make_input(vec![("Orders", vec!["OrderID"])], vec![]);
        let samples = vec![make_sample("ORDERS", 5000, vec![("orderid", 5000, 0.0)])];

        let spec = InputProcessor::new().process(&input, &samples);
        assert_eq!(spec.tables[0].row_count, 5000);
        assert_eq!(spec.tables[0].fields[0].cardinality, 5000);
    }

    #[test]
    fn test_sampled_type_overrides_declared() {
        let mut input = make_input(vec![("Orders", vec!["OrderDate"])], vec![]);
        input.tables[0].fields[0].declared_type = Some("string".to_string());

        let sample: QvdSampleData = serde_json::from_value(json!({
            "table_name": "Orders",
            "row_count": 10,
            "fields": [{"name": "OrderDate", "type": "date"}]
        }))
        .unwrap();

        let spec = InputProcessor::new().process(&input, &[sample]);
        assert_eq!(spec.tables[0].fields[0].field_type.as_deref(), Some("date"));
    }

    #[test]
    fn test_invalid_hint_kept_but_flagged() {
        let input = make_input(
            vec![("Orders", vec!["OrderID"])],
            vec![("Orders.OrderID", "Ghosts.GhostID")],
        );
        let spec = InputProcessor::new().process(&input, &[]);

        assert_eq!(spec.relationships.len(), 1);
        assert!(!spec.relationships[0].validated);
        assert_eq!(spec.relationships[0].to_table, "Ghosts");
    }

    #[test]
    fn test_valid_hint_fills_cardinalities() {
        let input = make_input(
            vec![
                ("Orders", vec!["CustomerID"]),
                ("Customers", vec!["CustomerID"]),
            ],
            vec![("Orders.CustomerID", "Customers.CustomerID")],
        );
        let samples = vec![
            make_sample("Orders", 1000, vec![("CustomerID", 120, 0.0)]),
            make_sample("Customers", 120, vec![("CustomerID", 120, 0.0)]),
        ];

        let spec = InputProcessor::new().process(&input, &samples);
        let rel = &spec.relationships[0];
        assert!(rel.validated);
        assert_eq!(rel.from_cardinality, Some(120));
        assert_eq!(rel.to_cardinality, Some(120));
    }

    #[test]
    fn test_infers_fk_relationship_without_hint() {
        let input = make_input(
            vec![
                ("Orders", vec!["OrderID", "customer_id"]),
                ("Customers", vec!["customer_id", "Name"]),
            ],
            vec![],
        );
        let spec = InputProcessor::new().process(&input, &[]);

        let inferred: Vec<_> = spec.relationships.iter().filter(|r| r.inferred).collect();
        assert_eq!(inferred.len(), 1);
        assert_eq!(inferred[0].from_table, "Orders");
        assert_eq!(inferred[0].to_table, "Customers");
        assert_eq!(inferred[0].confidence, Some(INFERRED_RELATIONSHIP_CONFIDENCE));
    }

    #[test]
    fn test_inference_never_duplicates_explicit_hint() {
        let input = make_input(
            vec![
                ("Orders", vec!["CustomerID"]),
                ("Customers", vec!["CustomerID"]),
            ],
            vec![("Orders.CustomerID", "Customers.CustomerID")],
        );
        let spec = InputProcessor::new().process(&input, &[]);
        assert_eq!(spec.relationships.len(), 1);
        assert!(!spec.relationships[0].inferred);
    }

    #[test]
    fn test_collects_date_fields_across_tables() {
        let input = make_input(
            vec![
                ("Orders", vec!["OrderDate", "Amount"]),
                ("Shipments", vec!["shipped_at"]),
            ],
            vec![],
        );
        let spec = InputProcessor::new().process(&input, &[]);

        assert_eq!(spec.date_fields.len(), 2);
        assert_eq!(spec.date_fields[0].field, "OrderDate");
        assert_eq!(spec.date_fields[1].table, "Shipments");
    }
}
