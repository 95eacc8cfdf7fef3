//! Input handling: wire types, boundary validation, and enrichment.

mod enriched;
mod processor;
mod types;
mod validate;

pub use enriched::{
    DateFieldRef, EnrichedField, EnrichedModelSpec, EnrichedRelationship, EnrichedTable,
    SemanticType,
};
pub use processor::{
    detect_date_field, detect_key_candidate, InputProcessor, INFERRED_RELATIONSHIP_CONFIDENCE,
    KEY_UNIQUENESS_RATIO,
};
pub use types::{QvdFieldSample, QvdSampleData, RelationshipHint, Stage1Field, Stage1Input, Stage1Table};
pub use validate::{validate_qvd_samples, validate_stage1_input};
