//! Structural warnings over the classified model.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::{EnrichedRelationship, EnrichedTable};

use super::classify::TableClassificationResult;

/// Classification confidence under which a low-confidence warning fires.
///
/// Hand-tuned cutoff preserved from the original behavior.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Kind of structural warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A table's classification confidence is below the threshold.
    LowConfidence,
    /// A table appears in no relationship endpoint.
    OrphanTable,
    /// A directed cycle exists among related tables.
    CircularRelationship,
}

/// A structural warning with the tables involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Tables involved in the warning.
    pub tables: Vec<String>,
    /// Human-readable description.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Generate structural warnings: low-confidence classifications, orphan
/// tables, and relationship cycles.
pub fn generate_warnings(
    classifications: &IndexMap<String, TableClassificationResult>,
    relationships: &[EnrichedRelationship],
    tables: &[EnrichedTable],
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for (name, result) in classifications {
        if result.confidence < LOW_CONFIDENCE_THRESHOLD {
            warnings.push(Warning {
                kind: WarningKind::LowConfidence,
                tables: vec![name.clone()],
                message: format!(
                    "Classification of '{}' as {:?} has low confidence ({:.2})",
                    name, result.classification, result.confidence
                ),
                suggestion: Some(
                    "Provide sampled statistics for this table or review the classification \
                     manually"
                        .to_string(),
                ),
            });
        }
    }

    // Orphans are noise for single-table models.
    if tables.len() > 1 {
        let mut connected: HashSet<String> = HashSet::new();
        for rel in relationships {
            connected.insert(rel.from_table.to_lowercase());
            connected.insert(rel.to_table.to_lowercase());
        }
        for table in tables {
            if !connected.contains(&table.name.to_lowercase()) {
                warnings.push(Warning {
                    kind: WarningKind::OrphanTable,
                    tables: vec![table.name.clone()],
                    message: format!("Table '{}' has no relationships to any other table", table.name),
                    suggestion: Some(
                        "Add a relationship hint or remove the table from the model".to_string(),
                    ),
                });
            }
        }
    }

    warnings.extend(detect_cycles(relationships));
    warnings
}

/// Depth-first cycle detection over the directed relationship graph
/// (each relationship is an edge from its `from` table to its `to` table).
fn detect_cycles(relationships: &[EnrichedRelationship]) -> Vec<Warning> {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut display_names: HashMap<String, String> = HashMap::new();

    for rel in relationships {
        let from = rel.from_table.to_lowercase();
        let to = rel.to_table.to_lowercase();
        display_names.entry(from.clone()).or_insert_with(|| rel.from_table.clone());
        display_names.entry(to.clone()).or_insert_with(|| rel.to_table.clone());
        adjacency.entry(from).or_default().push(to);
    }

    let mut warnings = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut nodes: Vec<&String> = adjacency.keys().collect();
    nodes.sort(); // deterministic traversal order

    for start in nodes {
        if visited.contains(start) {
            continue;
        }
        let mut path: Vec<String> = Vec::new();
        if let Some(cycle) = dfs_find_cycle(start, &adjacency, &mut visited, &mut path) {
            let tables: Vec<String> = cycle
                .iter()
                .map(|n| display_names.get(n).cloned().unwrap_or_else(|| n.clone()))
                .collect();
            warnings.push(Warning {
                kind: WarningKind::CircularRelationship,
                message: format!("Circular relationship detected: {}", tables.join(" -> ")),
                tables,
                suggestion: Some(
                    "Break the cycle by removing one relationship or routing it through a link \
                     table"
                        .to_string(),
                ),
            });
        }
    }

    warnings
}

fn dfs_find_cycle(
    node: &str,
    adjacency: &HashMap<String, Vec<String>>,
    visited: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    if let Some(pos) = path.iter().position(|n| n == node) {
        return Some(path[pos..].to_vec());
    }
    if visited.contains(node) {
        return None;
    }
    visited.insert(node.to_string());
    path.push(node.to_string());

    if let Some(next) = adjacency.get(node) {
        for neighbor in next {
            if let Some(cycle) = dfs_find_cycle(neighbor, adjacency, visited, path) {
                return Some(cycle);
            }
        }
    }

    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classify::{TableClassification, TableClassificationResult};

    fn rel(from: &str, to: &str) -> EnrichedRelationship {
        EnrichedRelationship {
            from_table: from.to_string(),
            from_field: "key".to_string(),
            to_table: to.to_string(),
            to_field: "key".to_string(),
            relation_type: None,
            from_cardinality: None,
            to_cardinality: None,
            validated: true,
            confidence: None,
            inferred: false,
        }
    }

    fn table(name: &str) -> EnrichedTable {
        EnrichedTable {
            name: name.to_string(),
            source_name: String::new(),
            fields: Vec::new(),
            row_count: 0,
            classification: None,
            classification_confidence: None,
        }
    }

    fn classification(name: &str, confidence: f64) -> (String, TableClassificationResult) {
        (
            name.to_string(),
            TableClassificationResult {
                table_name: name.to_string(),
                classification: TableClassification::Dimension,
                confidence,
                reasoning: Vec::new(),
            },
        )
    }

    #[test]
    fn test_low_confidence_warning() {
        let classifications: IndexMap<_, _> =
            vec![classification("A", 0.3), classification("B", 0.9)]
                .into_iter()
                .collect();
        let warnings = generate_warnings(&classifications, &[], &[table("A")]);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::LowConfidence);
        assert_eq!(warnings[0].tables, vec!["A"]);
    }

    #[test]
    fn test_orphan_table_warning() {
        let classifications: IndexMap<_, _> = vec![
            classification("A", 0.9),
            classification("B", 0.9),
            classification("C", 0.9),
        ]
        .into_iter()
        .collect();
        let tables = vec![table("A"), table("B"), table("C")];
        let rels = vec![rel("A", "B")];

        let warnings = generate_warnings(&classifications, &rels, &tables);
        let orphans: Vec<_> = warnings
            .iter()
            .filter(|w| w.kind == WarningKind::OrphanTable)
            .collect();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].tables, vec!["C"]);
    }

    #[test]
    fn test_single_table_model_has_no_orphan_warning() {
        let classifications: IndexMap<_, _> =
            vec![classification("A", 0.9)].into_iter().collect();
        let warnings = generate_warnings(&classifications, &[], &[table("A")]);
        assert!(warnings.iter().all(|w| w.kind != WarningKind::OrphanTable));
    }

    #[test]
    fn test_three_table_cycle_detected() {
        let rels = vec![rel("A", "B"), rel("B", "C"), rel("C", "A")];
        let warnings = detect_cycles(&rels);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::CircularRelationship);
        let mut tables = warnings[0].tables.clone();
        tables.sort();
        assert_eq!(tables, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycle_warning() {
        let rels = vec![rel("A", "B"), rel("A", "C"), rel("B", "C")];
        assert!(detect_cycles(&rels).is_empty());
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let rels = vec![rel("A", "A")];
        let warnings = detect_cycles(&rels);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].tables, vec!["A"]);
    }
}
