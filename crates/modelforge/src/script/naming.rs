//! Field-name constraints for generated script text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for an identifier placed into a script.
pub const MAX_FIELD_NAME_LEN: usize = 128;

/// Characters that must never appear in an identifier.
pub const FORBIDDEN_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Script keywords that collide with bare field names.
const RESERVED_WORDS: [&str; 20] = [
    "load", "select", "from", "where", "store", "drop", "table", "tables", "set", "let", "sub",
    "call", "if", "then", "else", "resident", "distinct", "qualify", "unqualify", "autonumber",
];

static PLAIN_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Suggest a corrected identifier for a name that violates the constraints:
/// forbidden characters are substituted with underscores and overlong names
/// are truncated. Reserved words are left for `quote_field` to bracket.
pub fn suggest_field_name(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect();

    if cleaned.chars().count() > MAX_FIELD_NAME_LEN {
        cleaned = cleaned.chars().take(MAX_FIELD_NAME_LEN).collect();
    }

    cleaned
}

/// Whether a name is a reserved script word.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name.to_lowercase().as_str())
}

/// Whether a name needs bracket-quoting: whitespace, non-identifier
/// characters, or collision with a reserved word.
pub fn needs_quoting(name: &str) -> bool {
    !PLAIN_IDENTIFIER.is_match(name) || is_reserved_word(name)
}

/// Bracket-quote a name when required, leaving plain identifiers untouched.
pub fn quote_field(name: &str) -> String {
    if needs_quoting(name) {
        format!("[{}]", name)
    } else {
        name.to_string()
    }
}

/// Full pipeline for placing a field name into script text: correct the
/// name, then quote it if it still needs quoting.
pub fn script_identifier(name: &str) -> String {
    quote_field(&suggest_field_name(name))
}
