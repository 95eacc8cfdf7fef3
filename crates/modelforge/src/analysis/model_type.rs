//! Model-type recommendation from classifications and relationships.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::{EnrichedRelationship, EnrichedTable};

use super::classify::{TableClassification, TableClassificationResult};

/// Confidence for a link-table recommendation (fact-to-fact detected).
pub const LINK_TABLE_CONFIDENCE: f64 = 0.8;

/// Confidence for a snowflake recommendation (dimension hierarchy detected).
pub const SNOWFLAKE_CONFIDENCE: f64 = 0.7;

/// Confidence for the default star schema recommendation.
pub const STAR_SCHEMA_CONFIDENCE: f64 = 0.85;

/// Field-signature overlap ratio at which two fact tables look concatenable.
pub const SIGNATURE_OVERLAP_RATIO: f64 = 0.8;

/// Warehouse modeling pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// One fact table directly linked to its dimensions.
    StarSchema,
    /// Star schema with dimensions normalized into hierarchies.
    Snowflake,
    /// Multiple fact tables joined through a shared bridge.
    LinkTable,
    /// Structurally-identical fact tables unioned into one.
    Concatenated,
}

impl ModelType {
    /// Identifier used in generated scripts and exports.
    pub fn label(&self) -> &'static str {
        match self {
            ModelType::StarSchema => "star_schema",
            ModelType::Snowflake => "snowflake",
            ModelType::LinkTable => "link_table",
            ModelType::Concatenated => "concatenated",
        }
    }
}

/// An alternative pattern surfaced alongside the recommendation.
///
/// Pros and cons are never empty for a surfaced alternative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAlternative {
    pub model: ModelType,
    pub reason: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// Recommended modeling pattern with explainable alternatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTypeRecommendation {
    pub recommended_model: ModelType,
    pub confidence: f64,
    pub alternatives: Vec<ModelAlternative>,
    pub reasoning: String,
}

/// Recommend an overall modeling pattern.
///
/// Rule cascade: fact-to-fact relationships demand a link table; dimension
/// hierarchies suggest snowflake with star as the fallback; concatenable
/// fact signatures are always offered as an alternative; star schema is the
/// default when no disqualifying structure exists.
pub fn detect_model_type(
    classifications: &IndexMap<String, TableClassificationResult>,
    relationships: &[EnrichedRelationship],
    tables: &[EnrichedTable],
) -> ModelTypeRecommendation {
    let class_of = |name: &str| -> Option<TableClassification> {
        classifications
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, result)| result.classification)
    };

    let fact_to_fact = relationships.iter().any(|rel| {
        class_of(&rel.from_table) == Some(TableClassification::Fact)
            && class_of(&rel.to_table) == Some(TableClassification::Fact)
    });

    let dim_to_dim = relationships.iter().any(|rel| {
        class_of(&rel.from_table) == Some(TableClassification::Dimension)
            && class_of(&rel.to_table) == Some(TableClassification::Dimension)
    });

    let concatenable = find_concatenable_facts(classifications, tables);

    let mut recommendation = if fact_to_fact {
        ModelTypeRecommendation {
            recommended_model: ModelType::LinkTable,
            confidence: LINK_TABLE_CONFIDENCE,
            alternatives: vec![ModelAlternative {
                model: ModelType::StarSchema,
                reason: "Viable if the fact tables can be merged into one".to_string(),
                pros: vec!["Simplest possible structure".to_string()],
                cons: vec![
                    "Direct fact-to-fact links create synthetic keys and circular references"
                        .to_string(),
                ],
            }],
            reasoning: "Multiple fact tables reference each other; a shared link table \
                        resolves the fact-to-fact relationships"
                .to_string(),
        }
    } else if dim_to_dim {
        ModelTypeRecommendation {
            recommended_model: ModelType::Snowflake,
            confidence: SNOWFLAKE_CONFIDENCE,
            alternatives: vec![ModelAlternative {
                model: ModelType::StarSchema,
                reason: "Denormalize the dimension hierarchy into single dimensions".to_string(),
                pros: vec![
                    "Fewer joins at query time".to_string(),
                    "Simpler for report authors".to_string(),
                ],
                cons: vec!["Duplicates hierarchy attributes across rows".to_string()],
            }],
            reasoning: "Dimensions reference other dimensions, indicating a normalized \
                        hierarchy best kept as a snowflake"
                .to_string(),
        }
    } else {
        ModelTypeRecommendation {
            recommended_model: ModelType::StarSchema,
            confidence: STAR_SCHEMA_CONFIDENCE,
            alternatives: Vec::new(),
            reasoning: "No disqualifying structure found; a star schema with directly \
                        linked dimensions is the simplest valid pattern"
                .to_string(),
        }
    };

    if let Some((a, b)) = concatenable {
        recommendation.alternatives.push(ModelAlternative {
            model: ModelType::Concatenated,
            reason: format!(
                "Fact tables '{}' and '{}' share a near-identical field signature",
                a, b
            ),
            pros: vec![
                "One unified fact table simplifies the model".to_string(),
                "Avoids synthetic link keys".to_string(),
            ],
            cons: vec!["Requires the source tables to stay structurally aligned".to_string()],
        });
    }

    recommendation
}

/// Find a pair of fact tables that could be concatenated: same name prefix
/// or near-identical field signatures.
fn find_concatenable_facts(
    classifications: &IndexMap<String, TableClassificationResult>,
    tables: &[EnrichedTable],
) -> Option<(String, String)> {
    let facts: Vec<&EnrichedTable> = tables
        .iter()
        .filter(|t| {
            classifications
                .get(&t.name)
                .map(|c| c.classification == TableClassification::Fact)
                .unwrap_or(false)
        })
        .collect();

    for (i, a) in facts.iter().enumerate() {
        for b in facts.iter().skip(i + 1) {
            if shares_name_prefix(&a.name, &b.name) || signature_overlap(a, b) >= SIGNATURE_OVERLAP_RATIO
            {
                return Some((a.name.clone(), b.name.clone()));
            }
        }
    }
    None
}

/// Whether two names share a prefix before a trailing discriminator,
/// e.g. `Sales_2023` / `Sales_2024`.
fn shares_name_prefix(a: &str, b: &str) -> bool {
    match (a.rsplit_once('_'), b.rsplit_once('_')) {
        (Some((pa, _)), Some((pb, _))) => !pa.is_empty() && pa.eq_ignore_ascii_case(pb),
        _ => false,
    }
}

fn signature_overlap(a: &EnrichedTable, b: &EnrichedTable) -> f64 {
    if a.fields.is_empty() || b.fields.is_empty() {
        return 0.0;
    }
    let shared = a
        .fields
        .iter()
        .filter(|f| b.field(&f.name).is_some())
        .count();
    shared as f64 / a.fields.len().max(b.fields.len()) as f64
}
