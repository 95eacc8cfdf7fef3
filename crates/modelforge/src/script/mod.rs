//! Script generation: staged synthesis, naming constraints, calendar
//! emission, and structural validation.

pub mod builder;
pub mod calendar;
pub mod naming;
pub mod validate;

pub use builder::{BuildContext, ScriptBuilder, StageScript};
pub use naming::{
    is_reserved_word, needs_quoting, quote_field, script_identifier, suggest_field_name,
    FORBIDDEN_CHARS, MAX_FIELD_NAME_LEN,
};
pub use validate::{assemble_full_script, validate_script, ScriptIssue, ScriptValidation};
