//! Staged script synthesis over the enriched specification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, ModelType, TableClassification};
use crate::config::{BuildConfig, KeyStrategy};
use crate::error::{ModelForgeError, Result};
use crate::input::{EnrichedModelSpec, EnrichedTable};
use crate::session::BuildStage;

use super::calendar;
use super::naming::script_identifier;

/// Everything a stage build needs, assembled by the orchestrator.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
    /// Enriched specification with classifications applied.
    pub spec: &'a EnrichedModelSpec,
    /// Analysis result for the same spec.
    pub analysis: &'a AnalysisResult,
    /// Build configuration.
    pub config: &'a BuildConfig,
    /// Chosen model type; required for every stage beyond A.
    pub model_type: Option<ModelType>,
    /// Timestamp stamped into the stage A header. Taken from the session's
    /// creation time so identical inputs produce byte-identical scripts.
    pub generated_at: DateTime<Utc>,
}

/// Output of building one stage. Not persisted until approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageScript {
    /// Stage this fragment belongs to.
    pub stage: BuildStage,
    /// The script fragment.
    pub script: String,
    /// Logical table names this stage produced.
    pub tables_included: Vec<String>,
    /// Line count, for progress reporting.
    pub estimated_lines: usize,
}

/// Synthesizes script fragments per build stage.
///
/// Deterministic template expansion: no randomness, same context always
/// yields byte-identical output.
pub struct ScriptBuilder;

impl ScriptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build one stage's script fragment.
    pub fn build_stage(&self, stage: BuildStage, ctx: &BuildContext<'_>) -> Result<StageScript> {
        if ctx.spec.tables.is_empty() {
            return Err(ModelForgeError::BuildContext {
                stage,
                message: "build context has no tables; input was not processed".to_string(),
            });
        }

        let (script, tables_included) = match stage {
            BuildStage::Configuration => self.build_configuration(ctx),
            other => {
                let model_type = ctx.model_type.ok_or(ModelForgeError::BuildContext {
                    stage,
                    message: "model type must be selected before building stages beyond A"
                        .to_string(),
                })?;
                match other {
                    BuildStage::Configuration => unreachable!(),
                    BuildStage::Dimensions => self.build_dimensions(ctx),
                    BuildStage::Facts => self.build_facts(ctx),
                    BuildStage::LinkTables => self.build_link_tables(ctx, model_type),
                    BuildStage::Calendars => self.build_calendars(ctx),
                    BuildStage::StoreCleanup => self.build_store_cleanup(ctx, model_type),
                }
            }
        };

        let estimated_lines = script.lines().count();
        Ok(StageScript {
            stage,
            script,
            tables_included,
            estimated_lines,
        })
    }

    /// Stage A: header, directives, path/date/time variables.
    fn build_configuration(&self, ctx: &BuildContext<'_>) -> (String, Vec<String>) {
        let model_label = match ctx.model_type {
            Some(model) => model.label().to_string(),
            None => format!(
                "{} (recommended)",
                ctx.analysis.model_recommendation.recommended_model.label()
            ),
        };

        let script = format!(
            "// ============================================================\n\
             // {project} - data model load script\n\
             // Model type: {model}\n\
             // Generated: {generated}\n\
             // ============================================================\n\
             \n\
             // Field matching across tables is case-sensitive; keep key casing stable.\n\
             SET vCaseSensitiveKeys = 1;\n\
             \n\
             SET vPathPrefix = '{prefix}';\n\
             SET vPathFinal = '{final_path}';\n\
             SET DateFormat = 'YYYY-MM-DD';\n\
             SET TimestampFormat = 'YYYY-MM-DD hh:mm:ss';\n\
             {months}\n",
            project = ctx.config.project_name,
            model = model_label,
            generated = ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            prefix = ctx.config.path_prefix,
            final_path = ctx.config.final_path(),
            months = calendar::month_name_directives(ctx.config.calendar_language),
        );

        (script, Vec::new())
    }

    /// Stage B: one load block per dimension table.
    fn build_dimensions(&self, ctx: &BuildContext<'_>) -> (String, Vec<String>) {
        let mut blocks = vec!["// ---- Dimensions ----".to_string()];
        let mut included = Vec::new();

        for table in self.tables_with(ctx, TableClassification::Dimension) {
            let loaded_name = format!("DIM_{}", table.name);
            let mut field_exprs: Vec<String> = Vec::new();

            for field in &table.fields {
                let rendered = script_identifier(&field.name);
                if table
                    .key_field()
                    .is_some_and(|k| k.name.eq_ignore_ascii_case(&field.name))
                {
                    field_exprs.push(format!(
                        "{} AS {}{}",
                        rendered,
                        script_identifier(&format!("{}Key", table.name)),
                        "  // primary key"
                    ));
                } else {
                    field_exprs.push(rendered);
                }
            }

            blocks.push(load_block(&loaded_name, &field_exprs, &source_path(ctx, table)));
            included.push(loaded_name);
        }

        if included.is_empty() {
            blocks.push("// No dimension tables classified.".to_string());
        }

        (blocks.join("\n\n") + "\n", included)
    }

    /// Stage C: one load block per fact table, with foreign keys renamed to
    /// the matching dimension's key to establish the star linkage.
    fn build_facts(&self, ctx: &BuildContext<'_>) -> (String, Vec<String>) {
        let dimensions: Vec<&EnrichedTable> =
            self.tables_with(ctx, TableClassification::Dimension);
        let mut blocks = vec!["// ---- Facts ----".to_string()];
        let mut included = Vec::new();

        for table in self.tables_with(ctx, TableClassification::Fact) {
            let loaded_name = format!("FACT_{}", table.name);
            let mut field_exprs: Vec<String> = Vec::new();

            for field in &table.fields {
                let rendered = script_identifier(&field.name);
                let dim_match = dimensions.iter().find(|dim| {
                    dim.key_field()
                        .is_some_and(|k| k.name.eq_ignore_ascii_case(&field.name))
                });

                if let Some(dim) = dim_match {
                    field_exprs.push(format!(
                        "{} AS {}  // FK -> DIM_{}",
                        rendered,
                        script_identifier(&format!("{}Key", dim.name)),
                        dim.name
                    ));
                } else {
                    // Measures and remaining attributes pass through unchanged.
                    field_exprs.push(rendered);
                }
            }

            blocks.push(load_block(&loaded_name, &field_exprs, &source_path(ctx, table)));
            included.push(loaded_name);
        }

        if included.is_empty() {
            blocks.push("// No fact tables classified.".to_string());
        }

        (blocks.join("\n\n") + "\n", included)
    }

    /// Stage D: composite-key bridge over the shared linking fields, only
    /// for the link_table model.
    fn build_link_tables(
        &self,
        ctx: &BuildContext<'_>,
        model_type: ModelType,
    ) -> (String, Vec<String>) {
        if model_type != ModelType::LinkTable {
            return (
                format!(
                    "// Link table not required for model type '{}'.\n",
                    model_type.label()
                ),
                Vec::new(),
            );
        }

        let facts: Vec<&EnrichedTable> = self.tables_with(ctx, TableClassification::Fact);
        let shared = shared_link_fields(&facts);
        if shared.is_empty() {
            return (
                "// ---- Link table ----\n\n// No fields shared across fact tables; nothing to link.\n"
                    .to_string(),
                Vec::new(),
            );
        }

        let mut blocks = vec!["// ---- Link table ----".to_string()];
        let mut first = true;

        for fact in &facts {
            let present: Vec<&String> = shared
                .iter()
                .filter(|name| fact.field(name).is_some())
                .collect();
            if present.len() < 2 {
                continue;
            }

            let composite = present
                .iter()
                .map(|name| script_identifier(name))
                .collect::<Vec<_>>()
                .join(" & '|' & ");
            let key_expr = match ctx.config.key_strategy {
                KeyStrategy::Composite => composite,
                KeyStrategy::Surrogate => format!("AutoNumber({})", composite),
            };

            let mut field_exprs = vec![format!("{} AS LinkKey", key_expr)];
            field_exprs.extend(present.iter().map(|name| script_identifier(name)));

            let header = if first {
                "LINK_Facts:".to_string()
            } else {
                "CONCATENATE (LINK_Facts)".to_string()
            };
            first = false;

            blocks.push(format!(
                "{}\nLOAD DISTINCT\n    {}\nRESIDENT FACT_{};",
                header,
                field_exprs.join(",\n    "),
                fact.name
            ));
        }

        let included = if first { Vec::new() } else { vec!["LINK_Facts".to_string()] };
        (blocks.join("\n\n") + "\n", included)
    }

    /// Stage E: one generated calendar per date field collected during
    /// enrichment, localized per the configured language.
    fn build_calendars(&self, ctx: &BuildContext<'_>) -> (String, Vec<String>) {
        let mut blocks = vec!["// ---- Calendars ----".to_string()];

        if ctx.spec.date_fields.is_empty() {
            blocks.push("// No date fields detected; calendars skipped.".to_string());
            return (blocks.join("\n\n") + "\n", Vec::new());
        }

        blocks.push(calendar::calendar_subroutine());

        let mut included = Vec::new();
        let mut seen = Vec::new();
        let mut calls = Vec::new();

        for date_ref in &ctx.spec.date_fields {
            // One calendar per field name; duplicates across tables collapse.
            let key = date_ref.field.to_lowercase();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);

            let source = self.loaded_table_name(ctx, &date_ref.table);
            calls.push(calendar::calendar_call(&source, &date_ref.field));
            included.push(calendar::calendar_table_name(&date_ref.field));
        }

        blocks.push(calls.join("\n"));
        (blocks.join("\n\n") + "\n", included)
    }

    /// Stage F: key unqualification plus one STORE per table produced in
    /// stages B-E, written into the Final sub-path.
    fn build_store_cleanup(
        &self,
        ctx: &BuildContext<'_>,
        model_type: ModelType,
    ) -> (String, Vec<String>) {
        let mut stored = Vec::new();

        for table in self.tables_with(ctx, TableClassification::Dimension) {
            stored.push(format!("DIM_{}", table.name));
        }
        for table in self.tables_with(ctx, TableClassification::Fact) {
            stored.push(format!("FACT_{}", table.name));
        }
        if model_type == ModelType::LinkTable {
            let facts = self.tables_with(ctx, TableClassification::Fact);
            if !shared_link_fields(&facts).is_empty() {
                stored.push("LINK_Facts".to_string());
            }
        }
        let mut seen = Vec::new();
        for date_ref in &ctx.spec.date_fields {
            let key = date_ref.field.to_lowercase();
            if !seen.contains(&key) {
                seen.push(key);
                stored.push(calendar::calendar_table_name(&date_ref.field));
            }
        }

        let mut script = String::from("// ---- Store & cleanup ----\n\nUNQUALIFY '*Key';\n\n");
        for name in &stored {
            script.push_str(&format!(
                "STORE {} INTO [{}/{}.qvd] (qvd);\n",
                name,
                ctx.config.final_path(),
                name
            ));
        }

        (script, stored)
    }

    /// Tables carrying a given classification, in input order.
    fn tables_with<'a>(
        &self,
        ctx: &'a BuildContext<'_>,
        classification: TableClassification,
    ) -> Vec<&'a EnrichedTable> {
        ctx.spec
            .tables
            .iter()
            .filter(|table| {
                ctx.analysis
                    .classifications
                    .get(&table.name)
                    .map(|c| c.classification == classification)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// The script-side name a source table was loaded under.
    fn loaded_table_name(&self, ctx: &BuildContext<'_>, table: &str) -> String {
        match ctx
            .analysis
            .classifications
            .get(table)
            .map(|c| c.classification)
        {
            // Calendar-classified source tables are never loaded directly.
            Some(TableClassification::Calendar) | None => table.to_string(),
            Some(classification) => format!("{}{}", classification.script_prefix(), table),
        }
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Field names appearing in two or more fact tables, in first-seen order
/// with first-seen casing.
fn shared_link_fields(facts: &[&EnrichedTable]) -> Vec<String> {
    let mut shared = Vec::new();
    for (idx, fact) in facts.iter().enumerate() {
        for field in &fact.fields {
            if shared
                .iter()
                .any(|s: &String| s.eq_ignore_ascii_case(&field.name))
            {
                continue;
            }
            let elsewhere = facts
                .iter()
                .enumerate()
                .any(|(other_idx, other)| other_idx != idx && other.field(&field.name).is_some());
            if elsewhere {
                shared.push(field.name.clone());
            }
        }
    }
    shared
}

fn source_path(ctx: &BuildContext<'_>, table: &EnrichedTable) -> String {
    format!(
        "{}/{}.qvd",
        ctx.config.path_prefix,
        table.name.to_lowercase()
    )
}

fn load_block(loaded_name: &str, field_exprs: &[String], source: &str) -> String {
    // Trailing comments on field lines carry the comma before the comment.
    let mut lines = Vec::new();
    for (idx, expr) in field_exprs.iter().enumerate() {
        let last = idx + 1 == field_exprs.len();
        let line = match (expr.split_once("  //"), last) {
            (Some((head, comment)), false) => format!("    {},  //{}", head, comment),
            (Some((head, comment)), true) => format!("    {}  //{}", head, comment),
            (None, false) => format!("    {},", expr),
            (None, true) => format!("    {}", expr),
        };
        lines.push(line);
    }

    format!(
        "{}:\nLOAD\n{}\nFROM [{}] (qvd);",
        loaded_name,
        lines.join("\n"),
        source
    )
}
