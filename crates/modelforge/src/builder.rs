//! The model builder orchestrator: sessions, staged builds, approvals,
//! review, and export.

use serde_json::Value;

use crate::analysis::{apply_classifications, Analyzer, AnalysisResult, ModelType};
use crate::config::BuildConfig;
use crate::error::{ModelForgeError, Result};
use crate::export::{build_stage2_output, Stage2Output};
use crate::input::{validate_qvd_samples, validate_stage1_input, InputProcessor};
use crate::review::{ReviewRecord, ReviewRequest, ReviewResponse, ScriptReviewer};
use crate::script::{
    assemble_full_script, validate_script, BuildContext, ScriptBuilder, StageScript,
};
use crate::session::{BuildStage, ModelBuilderSession, SessionStore};

/// Outcome of an external review request.
///
/// A failed review (transport error, unparseable response) is a normal
/// outcome, not an error: the session is left untouched and the build can
/// continue without a review.
#[derive(Debug)]
pub enum ReviewOutcome {
    /// The reviewer responded; the outcome is recorded in session history.
    Completed(ReviewResponse),
    /// The reviewer could not be reached or understood.
    Failed(String),
}

/// Drives a build session through stages A-F.
///
/// Holds at most one active session; every mutation is persisted to the
/// store before returning.
pub struct ModelBuilder {
    store: SessionStore,
    processor: InputProcessor,
    analyzer: Analyzer,
    script_builder: ScriptBuilder,
    session: Option<ModelBuilderSession>,
}

impl ModelBuilder {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            processor: InputProcessor::new(),
            analyzer: Analyzer::new(),
            script_builder: ScriptBuilder::new(),
            session: None,
        }
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&ModelBuilderSession> {
        self.session.as_ref()
    }

    /// Start a new session with the given configuration.
    pub fn start_session(&mut self, config: BuildConfig) -> Result<&ModelBuilderSession> {
        config.validate()?;

        let id = new_session_id(&config.project_name);
        let session = ModelBuilderSession::new(id, config);
        self.store.save(&session)?;
        self.session = Some(session);
        Ok(self.active()?)
    }

    /// Resume a stored session by id.
    pub fn resume_session(&mut self, id: &str) -> Result<&ModelBuilderSession> {
        let session = self.store.load(id)?;
        self.session = Some(session);
        Ok(self.active()?)
    }

    /// List stored session ids.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Validate and process raw structural input plus sampled statistics,
    /// attach the enriched spec and analysis to the session, and persist.
    pub fn process_input(&mut self, raw: &Value, samples: &[Value]) -> Result<&AnalysisResult> {
        let input = validate_stage1_input(raw)?;
        let sample_data = validate_qvd_samples(samples);

        let mut spec = self.processor.process(&input, &sample_data);
        let analysis = self.analyzer.analyze(&spec)?;
        apply_classifications(&mut spec, &analysis);

        let session = self.active_mut()?;
        session.spec = Some(spec);
        session.analysis = Some(analysis);
        session.refresh_pending_tables();
        let session = self.active()?;
        self.store.save(session)?;

        self.active()?
            .analysis
            .as_ref()
            .ok_or_else(|| ModelForgeError::Session("analysis missing after processing".to_string()))
    }

    /// Explicitly choose the model type. Rejected once stage D is approved,
    /// since the link table depends on it.
    pub fn select_model_type(&mut self, model: ModelType) -> Result<()> {
        let session = self.active_mut()?;
        if session.is_completed(BuildStage::LinkTables) {
            return Err(ModelForgeError::Workflow(
                "cannot change model type after stage D is approved".to_string(),
            ));
        }
        session.model_type = Some(model);
        let session = self.active()?;
        self.store.save(session)
    }

    /// Replace the build configuration. Rejected once any stage is approved;
    /// an approved fragment already embeds the old configuration.
    pub fn set_config(&mut self, config: BuildConfig) -> Result<()> {
        config.validate()?;
        let session = self.active_mut()?;
        if !session.completed_stages.is_empty() {
            return Err(ModelForgeError::Workflow(
                "cannot change configuration after a stage is approved".to_string(),
            ));
        }
        session.project_name = config.project_name.clone();
        session.config = config;
        let session = self.active()?;
        self.store.save(session)
    }

    /// Build the stage the session is currently waiting on, without
    /// approving it.
    pub fn build_current_stage(&mut self) -> Result<StageScript> {
        let stage = self.active()?.current_stage;
        self.build_stage(stage)
    }

    /// Build a specific stage. Only the current stage can be built; earlier
    /// stages are frozen and later ones are not reachable yet. Every stage
    /// past A needs an explicitly selected model type first.
    pub fn build_stage(&mut self, stage: BuildStage) -> Result<StageScript> {
        let session = self.active()?;
        if stage != session.current_stage {
            return Err(ModelForgeError::Workflow(format!(
                "cannot build stage {}: current stage is {}",
                stage, session.current_stage
            )));
        }
        if stage > BuildStage::Configuration && session.model_type.is_none() {
            return Err(ModelForgeError::Workflow(format!(
                "cannot build stage {}: select a model type first",
                stage
            )));
        }

        let ctx = Self::context(session)?;
        self.script_builder.build_stage(stage, &ctx)
    }

    /// Build, validate, and approve the current stage, advancing the cursor.
    /// When `script_override` is given, that edited text is validated and
    /// stored instead of the freshly built fragment. Fatal validation
    /// findings block the approval either way.
    pub fn approve_current_stage(
        &mut self,
        script_override: Option<String>,
    ) -> Result<StageScript> {
        let stage = self.active()?.current_stage;
        let mut built = self.build_stage(stage)?;
        if let Some(script) = script_override {
            built.estimated_lines = script.lines().count();
            built.script = script;
        }

        let validation = validate_script(&built.script);
        if !validation.valid {
            let details: Vec<String> = validation
                .errors
                .iter()
                .map(|e| e.message.clone())
                .collect();
            return Err(ModelForgeError::Workflow(format!(
                "stage {} failed validation: {}",
                stage,
                details.join("; ")
            )));
        }

        let session = self.active_mut()?;
        session.approve_stage(stage, built.script.clone())?;
        let session = self.active()?;
        self.store.save(session)?;
        Ok(built)
    }

    /// Roll back to an earlier stage, discarding it and everything after.
    pub fn go_back_to_stage(&mut self, stage: BuildStage) -> Result<()> {
        let session = self.active_mut()?;
        session.go_back_to(stage)?;
        let session = self.active()?;
        self.store.save(session)
    }

    /// Submit the approved script so far to an external reviewer.
    ///
    /// Requires at least one approved stage. A reviewer failure comes back
    /// as [`ReviewOutcome::Failed`] and never corrupts the session.
    pub fn request_review(&mut self, reviewer: &dyn ScriptReviewer) -> Result<ReviewOutcome> {
        let session = self.active()?;
        if session.approved_script_parts.is_empty() {
            return Err(ModelForgeError::Workflow(
                "nothing to review: no stage is approved yet".to_string(),
            ));
        }
        let spec = session.spec.as_ref().ok_or_else(|| {
            ModelForgeError::Workflow("cannot review: no input was processed".to_string())
        })?;
        let model_type = session.effective_model_type().ok_or_else(|| {
            ModelForgeError::Workflow("cannot review: no model type available".to_string())
        })?;

        let analysis = session.analysis.as_ref().ok_or_else(|| {
            ModelForgeError::Workflow("cannot review: no analysis available".to_string())
        })?;
        let facts_count = analysis
            .classifications
            .values()
            .filter(|c| c.classification == crate::analysis::TableClassification::Fact)
            .count();
        let dimensions_count = analysis
            .classifications
            .values()
            .filter(|c| c.classification == crate::analysis::TableClassification::Dimension)
            .count();

        let request = ReviewRequest {
            script: assemble_full_script(&session.approved_script_parts),
            model_type,
            facts_count,
            dimensions_count,
            expected_rows: spec.tables.iter().map(|t| t.row_count).sum(),
        };

        match reviewer.review(&request) {
            Ok(response) => {
                let record = ReviewRecord::from_response(reviewer.name(), &response);
                let session = self.active_mut()?;
                session.record_review(record);
                let session = self.active()?;
                self.store.save(session)?;
                Ok(ReviewOutcome::Completed(response))
            }
            Err(e) => Ok(ReviewOutcome::Failed(e.to_string())),
        }
    }

    /// Produce the Stage 2 export. Works at any point after input was
    /// processed; the script section carries whatever is approved so far.
    pub fn export_output(&self) -> Result<Stage2Output> {
        build_stage2_output(self.active()?)
    }

    fn context(session: &ModelBuilderSession) -> Result<BuildContext<'_>> {
        let spec = session.spec.as_ref().ok_or_else(|| {
            ModelForgeError::Workflow("no input processed: run process_input first".to_string())
        })?;
        let analysis = session.analysis.as_ref().ok_or_else(|| {
            ModelForgeError::Workflow("no analysis available: run process_input first".to_string())
        })?;

        Ok(BuildContext {
            spec,
            analysis,
            config: &session.config,
            model_type: session.model_type,
            generated_at: session.created_at,
        })
    }

    fn active(&self) -> Result<&ModelBuilderSession> {
        self.session
            .as_ref()
            .ok_or_else(|| ModelForgeError::Session("no active session".to_string()))
    }

    fn active_mut(&mut self) -> Result<&mut ModelBuilderSession> {
        self.session
            .as_mut()
            .ok_or_else(|| ModelForgeError::Session("no active session".to_string()))
    }
}

/// Session ids combine a slug of the project name with a creation timestamp.
fn new_session_id(project_name: &str) -> String {
    let slug: String = project_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!(
        "{}-{}",
        slug.trim_matches('-'),
        chrono::Utc::now().format("%Y%m%d%H%M%S%3f")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{MockReviewer, ReviewStatus};
    use serde_json::json;
    use tempfile::TempDir;

    fn raw_input() -> Value {
        json!({
            "version": "1.0",
            "source": "test",
            "parsed_at": "2026-01-15T10:00:00Z",
            "tables": [
                {"name": "Customers", "fields": [
                    {"name": "CustomerID"}, {"name": "Name", "type": "string"},
                    {"name": "City", "type": "string"}
                ]},
                {"name": "Orders", "fields": [
                    {"name": "OrderID"}, {"name": "CustomerID"},
                    {"name": "OrderDate", "type": "date"},
                    {"name": "Amount", "type": "decimal"}, {"name": "Quantity", "type": "integer"}
                ]}
            ],
            "relationship_hints": [
                {"from": "Orders.CustomerID", "to": "Customers.CustomerID", "type": "many-to-one"}
            ]
        })
    }

    fn raw_samples() -> Vec<Value> {
        json!([
            {"table_name": "Customers", "row_count": 500, "fields": []},
            {"table_name": "Orders", "row_count": 50000, "fields": []}
        ])
        .as_array()
        .cloned()
        .unwrap()
    }

    fn builder_with_input(dir: &TempDir) -> ModelBuilder {
        let mut builder = ModelBuilder::new(SessionStore::new(dir.path()));
        builder.start_session(BuildConfig::new("Sales")).unwrap();
        builder.process_input(&raw_input(), &raw_samples()).unwrap();
        builder.select_model_type(ModelType::StarSchema).unwrap();
        builder
    }

    #[test]
    fn test_operations_require_active_session() {
        let dir = TempDir::new().unwrap();
        let mut builder = ModelBuilder::new(SessionStore::new(dir.path()));
        assert!(matches!(
            builder.build_current_stage(),
            Err(ModelForgeError::Session(_))
        ));
    }

    #[test]
    fn test_build_requires_processed_input() {
        let dir = TempDir::new().unwrap();
        let mut builder = ModelBuilder::new(SessionStore::new(dir.path()));
        builder.start_session(BuildConfig::new("Sales")).unwrap();
        assert!(matches!(
            builder.build_current_stage(),
            Err(ModelForgeError::Workflow(_))
        ));
    }

    #[test]
    fn test_cannot_build_a_later_stage() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);
        assert!(matches!(
            builder.build_stage(BuildStage::Facts),
            Err(ModelForgeError::Workflow(_))
        ));
    }

    #[test]
    fn test_full_walkthrough_to_export() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);

        for _ in BuildStage::ALL {
            builder.approve_current_stage(None).unwrap();
        }

        let session = builder.session().unwrap();
        assert!(session.is_finished());

        let output = builder.export_output().unwrap();
        assert_eq!(output.model_type, ModelType::StarSchema);
        assert_eq!(output.facts.len(), 1);
        assert_eq!(output.dimensions.len(), 1);
        assert!(output.script.contains("DIM_Customers:"));
        assert!(output.script.contains("FACT_Orders:"));
        assert!(output.script.contains("STORE FACT_Orders"));
    }

    #[test]
    fn test_export_midway_carries_only_approved_fragments() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);
        builder.approve_current_stage(None).unwrap(); // A only

        let output = builder.export_output().unwrap();
        assert!(output.script.contains("SET"));
        assert!(!output.script.contains("DIM_Customers:"));
        // The model shape is complete even though the script is not.
        assert_eq!(output.facts.len(), 1);
        assert_eq!(output.dimensions.len(), 1);
    }

    #[test]
    fn test_export_requires_processed_input() {
        let dir = TempDir::new().unwrap();
        let mut builder = ModelBuilder::new(SessionStore::new(dir.path()));
        builder.start_session(BuildConfig::new("Sales")).unwrap();
        assert!(matches!(
            builder.export_output(),
            Err(ModelForgeError::Workflow(_))
        ));
    }

    #[test]
    fn test_stages_past_a_require_selected_model_type() {
        let dir = TempDir::new().unwrap();
        let mut builder = ModelBuilder::new(SessionStore::new(dir.path()));
        builder.start_session(BuildConfig::new("Sales")).unwrap();
        builder.process_input(&raw_input(), &raw_samples()).unwrap();

        // Stage A never depends on the model type.
        builder.approve_current_stage(None).unwrap();

        let err = builder.build_current_stage().unwrap_err();
        assert!(matches!(err, ModelForgeError::Workflow(_)));
        assert!(err.to_string().contains("model type"));

        builder.select_model_type(ModelType::StarSchema).unwrap();
        assert!(builder.build_current_stage().is_ok());
    }

    #[test]
    fn test_approve_stores_edited_script() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);
        builder.approve_current_stage(None).unwrap(); // A

        let built = builder.build_current_stage().unwrap();
        let edited = format!("{}\n// reviewed by hand\n", built.script);
        builder.approve_current_stage(Some(edited.clone())).unwrap();

        let session = builder.session().unwrap();
        assert_eq!(
            session.approved_script_parts.get(&BuildStage::Dimensions),
            Some(&edited)
        );
    }

    #[test]
    fn test_approve_rejects_invalid_edited_script() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);

        let err = builder
            .approve_current_stage(Some("LOAD [Broken FROM x;".to_string()))
            .unwrap_err();
        assert!(matches!(err, ModelForgeError::Workflow(_)));

        // The rejected text was not stored and the cursor did not move.
        let session = builder.session().unwrap();
        assert_eq!(session.current_stage, BuildStage::Configuration);
        assert!(session.approved_script_parts.is_empty());
    }

    #[test]
    fn test_resume_unknown_session_is_session_error() {
        let dir = TempDir::new().unwrap();
        let mut builder = ModelBuilder::new(SessionStore::new(dir.path()));
        assert!(matches!(
            builder.resume_session("no-such-session"),
            Err(ModelForgeError::Session(_))
        ));
    }

    #[test]
    fn test_pending_tables_shrink_as_stages_approve() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);

        let pending = &builder.session().unwrap().pending_tables;
        assert_eq!(pending, &vec!["Customers".to_string(), "Orders".to_string()]);

        builder.approve_current_stage(None).unwrap(); // A
        builder.approve_current_stage(None).unwrap(); // B: dimensions loaded
        assert_eq!(
            builder.session().unwrap().pending_tables,
            vec!["Orders".to_string()]
        );

        builder.approve_current_stage(None).unwrap(); // C: facts loaded
        assert!(builder.session().unwrap().pending_tables.is_empty());

        builder.go_back_to_stage(BuildStage::Dimensions).unwrap();
        assert_eq!(
            builder.session().unwrap().pending_tables,
            vec!["Customers".to_string(), "Orders".to_string()]
        );
    }

    #[test]
    fn test_rollback_discards_later_approvals() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);

        builder.approve_current_stage(None).unwrap(); // A
        builder.approve_current_stage(None).unwrap(); // B
        builder.approve_current_stage(None).unwrap(); // C

        builder.go_back_to_stage(BuildStage::Configuration).unwrap();

        let session = builder.session().unwrap();
        assert!(session.completed_stages.is_empty());
        assert_eq!(session.current_stage, BuildStage::Configuration);
        assert!(!session
            .approved_script_parts
            .contains_key(&BuildStage::Dimensions));
    }

    #[test]
    fn test_model_type_locked_after_stage_d() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);

        builder.select_model_type(ModelType::StarSchema).unwrap();
        for _ in 0..4 {
            builder.approve_current_stage(None).unwrap(); // A-D
        }

        assert!(matches!(
            builder.select_model_type(ModelType::LinkTable),
            Err(ModelForgeError::Workflow(_))
        ));
    }

    #[test]
    fn test_config_locked_after_first_approval() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);

        builder
            .set_config(BuildConfig::new("Sales").with_path_prefix("lib://other"))
            .unwrap();
        builder.approve_current_stage(None).unwrap();

        assert!(matches!(
            builder.set_config(BuildConfig::new("Sales")),
            Err(ModelForgeError::Workflow(_))
        ));
    }

    #[test]
    fn test_resume_restores_progress() {
        let dir = TempDir::new().unwrap();
        let id = {
            let mut builder = builder_with_input(&dir);
            builder.approve_current_stage(None).unwrap();
            builder.approve_current_stage(None).unwrap();
            builder.session().unwrap().id.clone()
        };

        let mut builder = ModelBuilder::new(SessionStore::new(dir.path()));
        builder.resume_session(&id).unwrap();

        let session = builder.session().unwrap();
        assert_eq!(session.current_stage, BuildStage::Facts);
        assert_eq!(session.completed_stages.len(), 2);
    }

    #[test]
    fn test_review_records_outcome() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);
        builder.approve_current_stage(None).unwrap();

        let outcome = builder.request_review(&MockReviewer::approving()).unwrap();
        match outcome {
            ReviewOutcome::Completed(response) => {
                assert_eq!(response.review_status, ReviewStatus::Approved);
            }
            ReviewOutcome::Failed(msg) => panic!("unexpected failure: {}", msg),
        }

        let session = builder.session().unwrap();
        assert_eq!(session.review_history.len(), 1);
        assert_eq!(session.review_history[0].provider, "mock");
    }

    #[test]
    fn test_review_failure_leaves_session_intact() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);
        builder.approve_current_stage(None).unwrap();

        let outcome = builder.request_review(&MockReviewer::failing()).unwrap();
        assert!(matches!(outcome, ReviewOutcome::Failed(_)));
        assert!(builder.session().unwrap().review_history.is_empty());
    }

    #[test]
    fn test_review_requires_an_approved_stage() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder_with_input(&dir);
        assert!(matches!(
            builder.request_review(&MockReviewer::approving()),
            Err(ModelForgeError::Workflow(_))
        ));
    }

    #[test]
    fn test_session_ids_embed_project_slug() {
        let id = new_session_id("My Sales Project");
        assert!(id.starts_with("my-sales-project-"));
    }
}
