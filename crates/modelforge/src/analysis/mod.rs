//! Model analysis: classification, pattern recommendation, and warnings.

mod classify;
mod model_type;
mod warnings;

pub use classify::{
    classify_table, TableClassification, TableClassificationResult, CALENDAR_CONFIDENCE,
    CALENDAR_FIELD_THRESHOLD, DEFAULT_CLASSIFICATION_CONFIDENCE, DIMENSION_ROW_THRESHOLD,
    FACT_ROW_THRESHOLD,
};
pub use model_type::{
    detect_model_type, ModelAlternative, ModelType, ModelTypeRecommendation,
    LINK_TABLE_CONFIDENCE, SNOWFLAKE_CONFIDENCE, STAR_SCHEMA_CONFIDENCE,
};
pub use warnings::{generate_warnings, Warning, WarningKind, LOW_CONFIDENCE_THRESHOLD};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ModelForgeError, Result};
use crate::input::EnrichedModelSpec;

/// Recommendation confidence above which no alternative guidance is surfaced.
const OVERWHELMING_CONFIDENCE: f64 = 0.9;

/// Full analysis of an enriched model specification.
///
/// Classifications are keyed by table name in input order so warning and
/// reasoning output is deterministic across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One classification per table, in input order.
    pub classifications: IndexMap<String, TableClassificationResult>,
    /// Recommended modeling pattern with alternatives.
    pub model_recommendation: ModelTypeRecommendation,
    /// Structural warnings.
    pub warnings: Vec<Warning>,
    /// Textual guidance derived from the analysis.
    pub recommendations: Vec<String>,
}

/// Classifies tables and recommends a modeling pattern.
///
/// Pure: a function of the enriched spec, safe to invoke concurrently for
/// different sessions.
pub struct Analyzer;

impl Analyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze an enriched specification.
    ///
    /// Fails when the spec has no tables; a model needs at least one.
    pub fn analyze(&self, spec: &EnrichedModelSpec) -> Result<AnalysisResult> {
        if spec.tables.is_empty() {
            return Err(ModelForgeError::EmptyInput(
                "cannot analyze a model with no tables".to_string(),
            ));
        }

        let classifications: IndexMap<String, TableClassificationResult> = spec
            .tables
            .iter()
            .map(|table| {
                (
                    table.name.clone(),
                    classify_table(table, &spec.tables),
                )
            })
            .collect();

        let model_recommendation =
            detect_model_type(&classifications, &spec.relationships, &spec.tables);
        let warnings = generate_warnings(&classifications, &spec.relationships, &spec.tables);
        let recommendations =
            generate_recommendations(&classifications, &model_recommendation, &warnings);

        Ok(AnalysisResult {
            classifications,
            model_recommendation,
            warnings,
            recommendations,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy classification outcomes onto the enriched tables.
///
/// Each table gets exactly one classification once analyzed.
pub fn apply_classifications(spec: &mut EnrichedModelSpec, analysis: &AnalysisResult) {
    for table in &mut spec.tables {
        if let Some(result) = analysis.classifications.get(&table.name) {
            table.classification = Some(result.classification);
            table.classification_confidence = Some(result.confidence);
        }
    }
    spec.recommended_model = Some(analysis.model_recommendation.recommended_model);
    spec.recommendation_confidence = Some(analysis.model_recommendation.confidence);
}

/// Derive textual guidance from the analysis outcome.
fn generate_recommendations(
    classifications: &IndexMap<String, TableClassificationResult>,
    recommendation: &ModelTypeRecommendation,
    warnings: &[Warning],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    let fact_count = classifications
        .values()
        .filter(|c| c.classification == TableClassification::Fact)
        .count();
    if fact_count == 0 {
        recommendations.push(
            "No fact table was identified. A warehouse model needs at least one table of \
             measurable events; review the classifications or provide row counts."
                .to_string(),
        );
    }

    if recommendation.confidence < OVERWHELMING_CONFIDENCE {
        if let Some(alt) = recommendation.alternatives.first() {
            recommendations.push(format!(
                "Consider {} as an alternative: {}",
                alt.model.label(),
                alt.reason
            ));
        }
    }

    let orphans: Vec<&str> = warnings
        .iter()
        .filter(|w| w.kind == WarningKind::OrphanTable)
        .flat_map(|w| w.tables.iter().map(String::as_str))
        .collect();
    if !orphans.is_empty() {
        recommendations.push(format!(
            "Connect orphan tables to the model or drop them: {}",
            orphans.join(", ")
        ));
    }

    recommendations
}
