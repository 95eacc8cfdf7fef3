//! Boundary validation for raw input documents.

use serde_json::Value;

use crate::error::{ModelForgeError, Result};

use super::types::{QvdSampleData, Stage1Input};

/// Validate a raw JSON document as a Stage1Input.
///
/// Rejects the whole document on the first violation; input is never
/// partially processed. An empty `tables` array is reported as the
/// distinguished `EmptyInput` error so callers can render "no tables found".
pub fn validate_stage1_input(raw: &Value) -> Result<Stage1Input> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ModelForgeError::validation("input must be a JSON object"))?;

    for key in ["version", "source", "parsed_at"] {
        match obj.get(key) {
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(Value::String(_)) => {
                return Err(ModelForgeError::validation(format!(
                    "'{}' must not be empty",
                    key
                )));
            }
            Some(_) => {
                return Err(ModelForgeError::validation(format!(
                    "'{}' must be a string",
                    key
                )));
            }
            None => {
                return Err(ModelForgeError::validation(format!(
                    "missing required field '{}'",
                    key
                )));
            }
        }
    }

    let tables = obj
        .get("tables")
        .and_then(Value::as_array)
        .ok_or_else(|| ModelForgeError::validation("'tables' must be an array"))?;

    if tables.is_empty() {
        return Err(ModelForgeError::EmptyInput(
            "no tables found in input".to_string(),
        ));
    }

    for (idx, table) in tables.iter().enumerate() {
        let name = table
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                ModelForgeError::validation(format!("table at index {} is missing a name", idx))
            })?;

        let fields = table
            .get("fields")
            .and_then(Value::as_array)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| {
                ModelForgeError::validation_in_table("table has no fields", name)
            })?;

        for (field_idx, field) in fields.iter().enumerate() {
            let has_name = field
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| !n.is_empty());
            if !has_name {
                return Err(ModelForgeError::validation_in_table(
                    format!("field at index {} is missing a name", field_idx),
                    name,
                ));
            }
        }
    }

    let input: Stage1Input = serde_json::from_value(raw.clone())?;
    Ok(input)
}

/// Validate a batch of raw QVD sample records.
///
/// Best-effort: individually malformed records are dropped silently so one
/// bad record never fails the whole batch. Missing samples only degrade
/// confidence downstream.
pub fn validate_qvd_samples(raw: &[Value]) -> Vec<QvdSampleData> {
    raw.iter()
        .filter_map(|v| serde_json::from_value::<QvdSampleData>(v.clone()).ok())
        .filter(|s| !s.table_name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_input() -> Value {
        json!({
            "version": "1.0",
            "source": "test",
            "parsed_at": "2026-01-15T10:00:00Z",
            "tables": [
                {"name": "Orders", "fields": [{"name": "OrderID"}]}
            ]
        })
    }

    #[test]
    fn test_accepts_minimal_input() {
        let input = validate_stage1_input(&minimal_input()).unwrap();
        assert_eq!(input.tables.len(), 1);
        assert_eq!(input.tables[0].name, "Orders");
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(
            validate_stage1_input(&json!(null)),
            Err(ModelForgeError::Validation { .. })
        ));
        assert!(matches!(
            validate_stage1_input(&json!([1, 2])),
            Err(ModelForgeError::Validation { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_version() {
        let mut raw = minimal_input();
        raw.as_object_mut().unwrap().remove("version");
        let err = validate_stage1_input(&raw).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_empty_tables_is_empty_input_error() {
        let mut raw = minimal_input();
        raw["tables"] = json!([]);
        assert!(matches!(
            validate_stage1_input(&raw),
            Err(ModelForgeError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_rejects_table_without_fields() {
        let mut raw = minimal_input();
        raw["tables"] = json!([{"name": "Orders", "fields": []}]);
        let err = validate_stage1_input(&raw).unwrap_err();
        assert!(err.to_string().contains("Orders"));
    }

    #[test]
    fn test_rejects_field_without_name() {
        let mut raw = minimal_input();
        raw["tables"][0]["fields"] = json!([{"type": "integer"}]);
        assert!(validate_stage1_input(&raw).is_err());
    }

    #[test]
    fn test_samples_drop_malformed_records() {
        let raw = vec![
            json!({"table_name": "Orders", "row_count": 100, "fields": []}),
            json!({"row_count": "not a table"}),
            json!(42),
            json!({"table_name": "Customers", "fields": [{"name": "CustomerID"}]}),
        ];

        let samples = validate_qvd_samples(&raw);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].table_name, "Orders");
        assert_eq!(samples[1].table_name, "Customers");
    }
}
