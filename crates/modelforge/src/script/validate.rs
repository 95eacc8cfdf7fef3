//! Structural checks over generated script text.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::session::BuildStage;

static LOAD_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bLOAD\s+\*").unwrap());

/// One finding from script validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptIssue {
    /// Stable machine-readable code, e.g. `BRACKET_MISMATCH`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// 1-based line the issue was found on, when attributable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Result of validating a script fragment or full script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptValidation {
    /// False when any fatal error was found.
    pub valid: bool,
    /// Fatal problems; the script must not be approved with any present.
    pub errors: Vec<ScriptIssue>,
    /// Non-fatal observations.
    pub warnings: Vec<ScriptIssue>,
}

/// Validate a script fragment: bracket balance is fatal, `LOAD *` is a
/// warning. Bracket depth is tracked per line so the report points at the
/// first line that goes negative or the last line left open.
pub fn validate_script(script: &str) -> ScriptValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut depth: i64 = 0;
    let mut last_open_line = None;
    for (idx, line) in script.lines().enumerate() {
        for c in line.chars() {
            match c {
                '[' => {
                    depth += 1;
                    last_open_line = Some(idx + 1);
                }
                ']' => {
                    depth -= 1;
                    if depth < 0 {
                        errors.push(ScriptIssue {
                            code: "BRACKET_MISMATCH".to_string(),
                            message: "closing bracket without a matching opener".to_string(),
                            line: Some(idx + 1),
                        });
                        depth = 0;
                    }
                }
                _ => {}
            }
        }

        if LOAD_STAR.is_match(line) {
            warnings.push(ScriptIssue {
                code: "LOAD_STAR".to_string(),
                message: "LOAD * carries every source field; list fields explicitly".to_string(),
                line: Some(idx + 1),
            });
        }
    }

    if depth > 0 {
        errors.push(ScriptIssue {
            code: "BRACKET_MISMATCH".to_string(),
            message: format!("{} unclosed bracket(s)", depth),
            line: last_open_line,
        });
    }

    ScriptValidation {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Concatenate approved stage fragments into one script, always in stage
/// order A-F regardless of insertion order, separated by blank lines.
pub fn assemble_full_script(parts: &IndexMap<BuildStage, String>) -> String {
    let mut sections = Vec::new();
    for stage in BuildStage::ALL {
        if let Some(fragment) = parts.get(&stage) {
            sections.push(fragment.trim_end().to_string());
        }
    }
    sections.join("\n\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_script_is_valid() {
        let result = validate_script("LOAD\n    A,\n    B\nFROM [lib://data/t.qvd] (qvd);\n");
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unclosed_bracket_is_fatal() {
        let result = validate_script("FROM [lib://data/t.qvd (qvd);\n");
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, "BRACKET_MISMATCH");
        assert_eq!(result.errors[0].line, Some(1));
    }

    #[test]
    fn test_stray_closer_reports_its_line() {
        let result = validate_script("LOAD A;\n] stray\n");
        assert!(!result.valid);
        assert_eq!(result.errors[0].line, Some(2));
    }

    #[test]
    fn test_load_star_is_warning_not_error() {
        let result = validate_script("T1:\nLOAD * FROM [lib://data/t.qvd] (qvd);\n");
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, "LOAD_STAR");
    }

    #[test]
    fn test_assemble_orders_stages_regardless_of_insertion() {
        let mut parts = IndexMap::new();
        parts.insert(BuildStage::Facts, "// stage C".to_string());
        parts.insert(BuildStage::Configuration, "// stage A".to_string());

        let full = assemble_full_script(&parts);
        let a = full.find("// stage A").unwrap();
        let c = full.find("// stage C").unwrap();
        assert!(a < c);
    }

    #[test]
    fn test_assemble_skips_missing_stages() {
        let mut parts = IndexMap::new();
        parts.insert(BuildStage::Configuration, "// stage A".to_string());
        let full = assemble_full_script(&parts);
        assert_eq!(full, "// stage A\n");
    }
}
