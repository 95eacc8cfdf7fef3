//! ModelForge: staged data-warehouse model building from sampled table metadata.
//!
//! ModelForge turns a structural description of source tables plus sampled
//! statistics into a complete, staged load script. Tables are classified as
//! facts, dimensions, links, or calendars; a modeling pattern is recommended;
//! and the script is built stage by stage (A-F), with each stage held for
//! approval before the next one can begin.
//!
//! # Core Principles
//!
//! - **Heuristic, then human**: classification and pattern detection are
//!   transparent scoring heuristics; every stage waits for explicit approval
//! - **Deterministic**: the same input and configuration always produce
//!   byte-identical scripts
//! - **Resumable**: sessions persist to JSON and pick up exactly where they
//!   stopped
//!
//! # Example
//!
//! ```no_run
//! use modelforge::{BuildConfig, ModelBuilder, SessionStore};
//!
//! let mut builder = ModelBuilder::new(SessionStore::new(".modelforge"));
//! builder.start_session(BuildConfig::new("Sales")).unwrap();
//!
//! let raw = std::fs::read_to_string("stage1.json").unwrap();
//! let input: serde_json::Value = serde_json::from_str(&raw).unwrap();
//! let analysis = builder.process_input(&input, &[]).unwrap();
//!
//! println!("Recommended: {}", analysis.model_recommendation.recommended_model.label());
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod review;
pub mod script;
pub mod session;

mod builder;

pub use analysis::{AnalysisResult, Analyzer, ModelType, TableClassification, Warning, WarningKind};
pub use builder::{ModelBuilder, ReviewOutcome};
pub use config::{BuildConfig, CalendarLanguage, KeyStrategy};
pub use error::{ModelForgeError, Result};
pub use export::Stage2Output;
pub use input::{EnrichedModelSpec, InputProcessor, Stage1Input};
pub use review::{GeminiReviewer, MockReviewer, ReviewStatus, ScriptReviewer};
pub use script::{ScriptBuilder, StageScript};
pub use session::{BuildStage, ModelBuilderSession, SessionStore};
