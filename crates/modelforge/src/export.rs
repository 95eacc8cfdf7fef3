//! Stage 2 output: the model as a machine-readable export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{ModelType, TableClassification};
use crate::error::{ModelForgeError, Result};
use crate::input::{EnrichedModelSpec, EnrichedTable, SemanticType};
use crate::review::ReviewStatus;
use crate::script::{assemble_full_script, calendar};
use crate::session::ModelBuilderSession;

/// Export format version.
pub const STAGE2_VERSION: &str = "2.0";

/// A fact table in the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFact {
    /// Source table name.
    pub name: String,
    /// Source identifier the table was read from.
    pub source: String,
    /// All field names after enrichment.
    pub fields: Vec<String>,
    /// Fields renamed to dimension keys during the load.
    pub dimension_keys: Vec<String>,
    /// Numeric measure fields.
    pub measures: Vec<String>,
}

/// A dimension table in the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDimension {
    pub name: String,
    /// Source identifier the table was read from.
    pub source: String,
    /// Primary key field, when one was detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    /// Non-key fields.
    pub attributes: Vec<String>,
}

/// A generated calendar in the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportCalendar {
    /// Calendar table name, e.g. `DIM_OrderDate`.
    pub name: String,
    /// Date field the calendar spans.
    pub date_field: String,
    /// Minimum sampled date, when statistics were available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    /// Maximum sampled date, when statistics were available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    /// Attribute fields the calendar derives.
    pub fields: Vec<String>,
}

/// One relationship in the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRelationship {
    pub from_table: String,
    pub from_field: String,
    pub to_table: String,
    pub to_field: String,
}

/// Condensed external-review outcome. Zeroed when no review ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReview {
    pub score: u8,
    /// Verdict of the latest review; null when no review ran.
    pub status: Option<ReviewStatus>,
    /// Issues reported in earlier review rounds and resolved before the
    /// final verdict.
    pub issues_fixed: usize,
}

/// The complete Stage 2 export: model shape, the script assembled from the
/// approved fragments so far, and the review outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage2Output {
    pub version: String,
    pub project_name: String,
    pub model_type: ModelType,
    pub created_at: DateTime<Utc>,
    pub facts: Vec<ExportFact>,
    pub dimensions: Vec<ExportDimension>,
    pub calendars: Vec<ExportCalendar>,
    pub relationships: Vec<ExportRelationship>,
    /// The approved fragments in stage order; partial until stage F.
    pub script: String,
    pub gemini_review: ExportReview,
}

/// Build the Stage 2 export. Requires processed input; callable at any
/// point, even with stages incomplete — the script section then carries
/// only the fragments approved so far.
pub fn build_stage2_output(session: &ModelBuilderSession) -> Result<Stage2Output> {
    let spec = session.spec.as_ref().ok_or_else(|| {
        ModelForgeError::Workflow("cannot export: no input was processed".to_string())
    })?;
    let model_type = session.effective_model_type().ok_or_else(|| {
        ModelForgeError::Workflow("cannot export: no model type available".to_string())
    })?;

    let dims: Vec<&EnrichedTable> = spec
        .tables
        .iter()
        .filter(|t| t.classification == Some(TableClassification::Dimension))
        .collect();

    let mut facts = Vec::new();
    let mut dimensions = Vec::new();
    for table in &spec.tables {
        match table.classification {
            Some(TableClassification::Fact) => facts.push(export_fact(table, &dims)),
            Some(TableClassification::Dimension) => dimensions.push(export_dimension(table)),
            _ => {}
        }
    }

    let mut calendars = Vec::new();
    let mut seen = Vec::new();
    for date_ref in &spec.date_fields {
        let key = date_ref.field.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        let sampled = spec
            .table(&date_ref.table)
            .and_then(|t| t.field(&date_ref.field));
        calendars.push(ExportCalendar {
            name: calendar::calendar_table_name(&date_ref.field),
            date_field: date_ref.field.clone(),
            min_date: sampled.and_then(|f| f.min_value.clone()),
            max_date: sampled.and_then(|f| f.max_value.clone()),
            fields: calendar::CALENDAR_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        });
    }

    let relationships = spec
        .relationships
        .iter()
        .map(|rel| ExportRelationship {
            from_table: rel.from_table.clone(),
            from_field: rel.from_field.clone(),
            to_table: rel.to_table.clone(),
            to_field: rel.to_field.clone(),
        })
        .collect();

    let gemini_review = match session.review_history.last() {
        Some(last) => ExportReview {
            score: last.score,
            status: Some(last.status),
            issues_fixed: session
                .review_history
                .iter()
                .rev()
                .skip(1)
                .map(|r| r.issue_count)
                .sum(),
        },
        None => ExportReview {
            score: 0,
            status: None,
            issues_fixed: 0,
        },
    };

    Ok(Stage2Output {
        version: STAGE2_VERSION.to_string(),
        project_name: session.project_name.clone(),
        model_type,
        created_at: session.created_at,
        facts,
        dimensions,
        calendars,
        relationships,
        script: assemble_full_script(&session.approved_script_parts),
        gemini_review,
    })
}

fn export_fact(table: &EnrichedTable, dims: &[&EnrichedTable]) -> ExportFact {
    let mut dimension_keys = Vec::new();
    let mut measures = Vec::new();

    for field in &table.fields {
        let links_dimension = dims.iter().any(|dim| {
            dim.key_field()
                .is_some_and(|k| k.name.eq_ignore_ascii_case(&field.name))
        });
        if links_dimension {
            dimension_keys.push(field.name.clone());
        } else if field.semantic_type == Some(SemanticType::Measure) {
            measures.push(field.name.clone());
        }
    }

    ExportFact {
        name: table.name.clone(),
        source: table.source_name.clone(),
        fields: table.fields.iter().map(|f| f.name.clone()).collect(),
        dimension_keys,
        measures,
    }
}

fn export_dimension(table: &EnrichedTable) -> ExportDimension {
    let primary_key = table.key_field().map(|f| f.name.clone());
    let attributes = table
        .fields
        .iter()
        .filter(|f| Some(&f.name) != primary_key.as_ref())
        .map(|f| f.name.clone())
        .collect();

    ExportDimension {
        name: table.name.clone(),
        source: table.source_name.clone(),
        primary_key,
        attributes,
    }
}
