//! The persistent build session: stage cursor, approved fragments, history.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, ModelType, TableClassification};
use crate::config::BuildConfig;
use crate::error::{ModelForgeError, Result};
use crate::input::EnrichedModelSpec;
use crate::review::ReviewRecord;

use super::stage::BuildStage;

/// A model build session.
///
/// Holds everything needed to resume an interrupted build: the enriched
/// spec, analysis, per-stage approved fragments, and the stage cursor.
/// The session only ever moves forward via [`approve_stage`] or backward
/// via [`go_back_to`]; there is no way to skip a stage.
///
/// [`approve_stage`]: ModelBuilderSession::approve_stage
/// [`go_back_to`]: ModelBuilderSession::go_back_to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBuilderSession {
    /// Unique session id.
    pub id: String,
    /// Project name this session builds for.
    pub project_name: String,
    /// When the session was created. Also stamps generated scripts.
    pub created_at: DateTime<Utc>,
    /// When the session was last mutated.
    pub updated_at: DateTime<Utc>,
    /// The stage currently awaiting build/approval.
    pub current_stage: BuildStage,
    /// Stages approved so far, in approval order.
    pub completed_stages: Vec<BuildStage>,
    /// Explicitly chosen model type, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,
    /// Approved script fragments keyed by stage.
    pub approved_script_parts: IndexMap<BuildStage, String>,
    /// Tables whose load stage has not been approved yet.
    #[serde(default)]
    pub pending_tables: Vec<String>,
    /// Build configuration in effect.
    pub config: BuildConfig,
    /// External review outcomes, newest last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub review_history: Vec<ReviewRecord>,
    /// Enriched spec, present once input has been processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<EnrichedModelSpec>,
    /// Analysis result, present once input has been processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

impl ModelBuilderSession {
    /// Create a fresh session at stage A.
    pub fn new(id: impl Into<String>, config: BuildConfig) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            project_name: config.project_name.clone(),
            created_at: now,
            updated_at: now,
            current_stage: BuildStage::Configuration,
            completed_stages: Vec::new(),
            model_type: None,
            approved_script_parts: IndexMap::new(),
            pending_tables: Vec::new(),
            config,
            review_history: Vec::new(),
            spec: None,
            analysis: None,
        }
    }

    /// Whether a stage has been approved.
    pub fn is_completed(&self, stage: BuildStage) -> bool {
        self.completed_stages.contains(&stage)
    }

    /// Whether every stage A-F has been approved.
    pub fn is_finished(&self) -> bool {
        BuildStage::ALL.iter().all(|s| self.is_completed(*s))
    }

    /// The effective model type: the explicit choice, else the analysis
    /// recommendation.
    pub fn effective_model_type(&self) -> Option<ModelType> {
        self.model_type.or_else(|| {
            self.analysis
                .as_ref()
                .map(|a| a.model_recommendation.recommended_model)
        })
    }

    /// Approve the current stage, storing its script fragment and advancing
    /// the cursor. Approving any stage other than the current one is an
    /// error, as is approving past F.
    pub fn approve_stage(&mut self, stage: BuildStage, script: String) -> Result<()> {
        if stage != self.current_stage {
            return Err(ModelForgeError::Session(format!(
                "cannot approve stage {}: current stage is {}",
                stage, self.current_stage
            )));
        }
        if self.is_completed(stage) {
            return Err(ModelForgeError::Session(format!(
                "stage {} is already approved",
                stage
            )));
        }

        self.approved_script_parts.insert(stage, script);
        self.completed_stages.push(stage);
        if let Some(next) = stage.next() {
            self.current_stage = next;
        }
        self.refresh_pending_tables();
        self.touch();
        Ok(())
    }

    /// Roll back to an earlier stage: the target and everything after it
    /// lose their approval and script fragments, and the cursor moves to
    /// the target. Going "back" to the current or a later stage is an error.
    pub fn go_back_to(&mut self, stage: BuildStage) -> Result<()> {
        if stage >= self.current_stage {
            return Err(ModelForgeError::Session(format!(
                "cannot go back to stage {}: current stage is {}",
                stage, self.current_stage
            )));
        }

        self.completed_stages.retain(|s| *s < stage);
        self.approved_script_parts.retain(|s, _| *s < stage);
        self.current_stage = stage;
        self.refresh_pending_tables();
        self.touch();
        Ok(())
    }

    /// Recompute which tables still await their load stage. A table is
    /// pending until the stage that loads its classification (B for
    /// dimensions, C for facts, D for links, E for calendars) is approved.
    pub fn refresh_pending_tables(&mut self) {
        let Some(spec) = &self.spec else {
            self.pending_tables = Vec::new();
            return;
        };

        self.pending_tables = spec
            .tables
            .iter()
            .filter(|table| {
                let stage = match table.classification {
                    Some(TableClassification::Fact) => BuildStage::Facts,
                    Some(TableClassification::Link) => BuildStage::LinkTables,
                    Some(TableClassification::Calendar) => BuildStage::Calendars,
                    _ => BuildStage::Dimensions,
                };
                !self.completed_stages.contains(&stage)
            })
            .map(|table| table.name.clone())
            .collect();
    }

    /// Record an external review outcome.
    pub fn record_review(&mut self, record: ReviewRecord) {
        self.review_history.push(record);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ModelBuilderSession {
        ModelBuilderSession::new("s-1", BuildConfig::new("Sales"))
    }

    #[test]
    fn test_new_session_starts_at_a() {
        let s = session();
        assert_eq!(s.current_stage, BuildStage::Configuration);
        assert!(s.completed_stages.is_empty());
        assert!(s.approved_script_parts.is_empty());
        assert!(!s.is_finished());
    }

    #[test]
    fn test_approve_advances_in_order() {
        let mut s = session();
        s.approve_stage(BuildStage::Configuration, "// A".to_string())
            .unwrap();
        assert_eq!(s.current_stage, BuildStage::Dimensions);
        assert!(s.is_completed(BuildStage::Configuration));
        assert_eq!(
            s.approved_script_parts.get(&BuildStage::Configuration),
            Some(&"// A".to_string())
        );
    }

    #[test]
    fn test_cannot_skip_a_stage() {
        let mut s = session();
        let err = s
            .approve_stage(BuildStage::Facts, "// C".to_string())
            .unwrap_err();
        assert!(matches!(err, ModelForgeError::Session(_)));
        assert_eq!(s.current_stage, BuildStage::Configuration);
    }

    #[test]
    fn test_rollback_discards_target_and_later() {
        let mut s = session();
        for (stage, text) in [
            (BuildStage::Configuration, "// A"),
            (BuildStage::Dimensions, "// B"),
            (BuildStage::Facts, "// C"),
        ] {
            s.approve_stage(stage, text.to_string()).unwrap();
        }

        s.go_back_to(BuildStage::Dimensions).unwrap();

        assert_eq!(s.current_stage, BuildStage::Dimensions);
        assert_eq!(s.completed_stages, vec![BuildStage::Configuration]);
        assert!(s.approved_script_parts.contains_key(&BuildStage::Configuration));
        assert!(!s.approved_script_parts.contains_key(&BuildStage::Dimensions));
        assert!(!s.approved_script_parts.contains_key(&BuildStage::Facts));
    }

    #[test]
    fn test_cannot_go_back_to_current_or_later_stage() {
        let mut s = session();
        s.approve_stage(BuildStage::Configuration, "// A".to_string())
            .unwrap();

        assert!(s.go_back_to(BuildStage::Dimensions).is_err());
        assert!(s.go_back_to(BuildStage::Facts).is_err());
    }

    #[test]
    fn test_finished_after_all_six_approvals() {
        let mut s = session();
        for stage in BuildStage::ALL {
            s.approve_stage(stage, format!("// {}", stage)).unwrap();
        }
        assert!(s.is_finished());
        // Cursor stays at F once the build is complete.
        assert_eq!(s.current_stage, BuildStage::StoreCleanup);
    }

    #[test]
    fn test_round_trips_through_json() {
        let mut s = session();
        s.approve_stage(BuildStage::Configuration, "// A".to_string())
            .unwrap();

        let json = serde_json::to_string(&s).unwrap();
        let back: ModelBuilderSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, s.id);
        assert_eq!(back.current_stage, BuildStage::Dimensions);
        assert_eq!(back.completed_stages, s.completed_stages);
    }
}
