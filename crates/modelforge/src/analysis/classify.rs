//! Heuristic table classification.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::input::{EnrichedField, EnrichedTable};

/// Row count at which a table starts looking like a fact table.
pub const FACT_ROW_THRESHOLD: u64 = 10_000;

/// Row count under which a table starts looking like a dimension.
pub const DIMENSION_ROW_THRESHOLD: u64 = 1_000;

/// Number of co-occurring calendar-shaped fields that makes a table a
/// calendar with very high confidence.
pub const CALENDAR_FIELD_THRESHOLD: usize = 5;

/// Confidence floor applied when the calendar field threshold is met.
pub const CALENDAR_CONFIDENCE: f64 = 0.95;

/// Confidence assigned when no signal dominates and the default applies.
pub const DEFAULT_CLASSIFICATION_CONFIDENCE: f64 = 0.4;

static MEASURE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(amount|quantity|total|count|price|revenue|cost)").unwrap());

static DESCRIPTIVE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(name|description|category|address|city|country|region|label|status)").unwrap()
});

static FK_SHAPE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)_?id$").unwrap());

const CALENDAR_FIELD_NAMES: [&str; 6] = ["year", "month", "monthname", "day", "quarter", "week"];

/// Role a table plays in the warehouse model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableClassification {
    /// Measurable events: high row count, numeric measures, foreign keys.
    Fact,
    /// Descriptive attributes used to filter and group facts.
    Dimension,
    /// Bridge resolving a many-to-many relationship.
    Link,
    /// Generated calendar attributes over a date range.
    Calendar,
}

impl TableClassification {
    /// Table-name prefix used in generated load scripts.
    pub fn script_prefix(&self) -> &'static str {
        match self {
            TableClassification::Fact => "FACT_",
            TableClassification::Dimension => "DIM_",
            TableClassification::Link => "LINK_",
            TableClassification::Calendar => "DIM_",
        }
    }
}

/// Outcome of classifying one table, with the explainable trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableClassificationResult {
    /// Table that was classified.
    pub table_name: String,
    /// Chosen role.
    pub classification: TableClassification,
    /// Normalized strength of the winning signal, in [0, 1].
    pub confidence: f64,
    /// Human-readable reasoning trail, one line per contributing rule.
    pub reasoning: Vec<String>,
}

/// Classify a table by accumulating weighted signals.
///
/// Not a fixed decision tree: every rule contributes a score and a reasoning
/// line, and the strongest accumulated signal wins. The default when nothing
/// dominates is dimension at reduced confidence.
pub fn classify_table(table: &EnrichedTable, all_tables: &[EnrichedTable]) -> TableClassificationResult {
    let mut reasoning = Vec::new();
    let mut fact = 0.0_f64;
    let mut dimension = 0.0_f64;
    let mut link = 0.0_f64;
    let mut calendar = 0.0_f64;

    // Fact signals: volume and measures.
    if table.row_count >= FACT_ROW_THRESHOLD {
        fact += 2.0;
        reasoning.push(format!(
            "High row count ({}) suggests transactional data",
            table.row_count
        ));
    }
    let measures: Vec<&str> = table
        .fields
        .iter()
        .filter(|f| is_measure_like(f))
        .map(|f| f.name.as_str())
        .collect();
    if measures.len() >= 2 {
        fact += 2.0;
        reasoning.push(format!(
            "{} measure-like fields ({}) suggest a fact table",
            measures.len(),
            measures.join(", ")
        ));
    }

    // Dimension signal: small and descriptive.
    if table.row_count < DIMENSION_ROW_THRESHOLD {
        let descriptive = table.fields.iter().filter(|f| is_descriptive(f)).count();
        if descriptive * 2 > table.fields.len() {
            dimension += 2.0;
            reasoning.push(format!(
                "Low row count ({}) with {} descriptive fields suggests a dimension",
                table.row_count, descriptive
            ));
        }
    }

    // Calendar signal: dense set of calendar-shaped fields.
    let calendar_hits = table
        .fields
        .iter()
        .filter(|f| CALENDAR_FIELD_NAMES.contains(&f.name.to_lowercase().as_str()))
        .count();
    if calendar_hits >= CALENDAR_FIELD_THRESHOLD {
        calendar += 6.0;
        reasoning.push(format!(
            "{} calendar-shaped fields (Year/Month/Quarter/...) identify a calendar table",
            calendar_hits
        ));
    } else if calendar_hits >= 3 {
        calendar += 2.0;
        reasoning.push(format!(
            "{} calendar-shaped fields hint at a calendar table",
            calendar_hits
        ));
    }

    // Link signal: almost nothing but foreign keys into other tables.
    let fk_fields: Vec<&str> = table
        .fields
        .iter()
        .filter(|f| references_other_table(f, table, all_tables))
        .map(|f| f.name.as_str())
        .collect();
    if fk_fields.len() >= 2 && table.fields.len() - fk_fields.len() <= 1 {
        link += 3.0;
        reasoning.push(format!(
            "Fields are almost entirely foreign keys ({}), suggesting a bridge table",
            fk_fields.join(", ")
        ));
        if name_combines_tables(&table.name, table, all_tables) {
            link += 2.0;
            reasoning.push(format!(
                "Table name '{}' combines two other table names",
                table.name
            ));
        }
    }

    let total = fact + dimension + link + calendar;
    let candidates = [
        (TableClassification::Fact, fact),
        (TableClassification::Dimension, dimension),
        (TableClassification::Link, link),
        (TableClassification::Calendar, calendar),
    ];

    let (classification, confidence) = if total == 0.0 {
        reasoning.push("No dominant signal; defaulting to dimension".to_string());
        (TableClassification::Dimension, DEFAULT_CLASSIFICATION_CONFIDENCE)
    } else {
        let (winner, score) = candidates
            .iter()
            .copied()
            .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
            .unwrap();
        let mut confidence = (score / total).clamp(0.0, 1.0);
        if winner == TableClassification::Calendar && calendar_hits >= CALENDAR_FIELD_THRESHOLD {
            confidence = confidence.max(CALENDAR_CONFIDENCE);
        }
        (winner, confidence)
    };

    TableClassificationResult {
        table_name: table.name.clone(),
        classification,
        confidence,
        reasoning,
    }
}

fn is_measure_like(field: &EnrichedField) -> bool {
    if field.is_key_candidate || field.is_date_field {
        return false;
    }
    MEASURE_NAME_PATTERN.is_match(&field.name) || field.is_numeric()
}

fn is_descriptive(field: &EnrichedField) -> bool {
    if field.is_key_candidate || field.is_date_field || field.is_numeric() {
        return false;
    }
    // Named like an attribute, or an untyped plain field.
    DESCRIPTIVE_NAME_PATTERN.is_match(&field.name) || field.field_type.is_none()
        || field
            .field_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("string") || t.eq_ignore_ascii_case("text"))
}

/// Whether a FK-shaped field plausibly points at a *different* table.
fn references_other_table(
    field: &EnrichedField,
    table: &EnrichedTable,
    all_tables: &[EnrichedTable],
) -> bool {
    if !FK_SHAPE_PATTERN.is_match(&field.name) {
        return false;
    }

    all_tables.iter().any(|other| {
        if other.name.eq_ignore_ascii_case(&table.name) {
            return false;
        }
        other
            .field(&field.name)
            .is_some_and(|f| f.is_key_candidate)
    })
}

/// Whether a table name looks like a combination of two other table names
/// (e.g. `Order_Items` combining `Orders` and `Items`).
fn name_combines_tables(name: &str, table: &EnrichedTable, all_tables: &[EnrichedTable]) -> bool {
    let lower = name.to_lowercase();
    let matches = all_tables
        .iter()
        .filter(|other| !other.name.eq_ignore_ascii_case(&table.name))
        .filter(|other| {
            let other_lower = other.name.to_lowercase();
            let singular = other_lower.strip_suffix('s').unwrap_or(&other_lower);
            lower.contains(singular)
        })
        .count();
    matches >= 2
}
