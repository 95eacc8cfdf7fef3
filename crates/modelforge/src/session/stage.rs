//! Build stages A-F as a closed, ordered set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the six ordered build stages.
///
/// Modeled as a closed enum (rather than free-form letters) so skipping a
/// stage or approving one twice is rejectable before any script is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildStage {
    /// A: header, directives, and path/date variables.
    #[serde(rename = "A")]
    Configuration,
    /// B: dimension load blocks.
    #[serde(rename = "B")]
    Dimensions,
    /// C: fact load blocks with star linkage.
    #[serde(rename = "C")]
    Facts,
    /// D: link/bridge table (link_table model only).
    #[serde(rename = "D")]
    LinkTables,
    /// E: generated calendar dimensions.
    #[serde(rename = "E")]
    Calendars,
    /// F: store statements and cleanup.
    #[serde(rename = "F")]
    StoreCleanup,
}

impl BuildStage {
    /// All stages in build order.
    pub const ALL: [BuildStage; 6] = [
        BuildStage::Configuration,
        BuildStage::Dimensions,
        BuildStage::Facts,
        BuildStage::LinkTables,
        BuildStage::Calendars,
        BuildStage::StoreCleanup,
    ];

    /// Stage letter, A through F.
    pub fn letter(&self) -> char {
        match self {
            BuildStage::Configuration => 'A',
            BuildStage::Dimensions => 'B',
            BuildStage::Facts => 'C',
            BuildStage::LinkTables => 'D',
            BuildStage::Calendars => 'E',
            BuildStage::StoreCleanup => 'F',
        }
    }

    /// Parse a stage letter (case-insensitive).
    pub fn from_letter(letter: char) -> Option<BuildStage> {
        match letter.to_ascii_uppercase() {
            'A' => Some(BuildStage::Configuration),
            'B' => Some(BuildStage::Dimensions),
            'C' => Some(BuildStage::Facts),
            'D' => Some(BuildStage::LinkTables),
            'E' => Some(BuildStage::Calendars),
            'F' => Some(BuildStage::StoreCleanup),
            _ => None,
        }
    }

    /// Human-readable stage title.
    pub fn title(&self) -> &'static str {
        match self {
            BuildStage::Configuration => "Configuration",
            BuildStage::Dimensions => "Dimensions",
            BuildStage::Facts => "Facts",
            BuildStage::LinkTables => "Link Tables",
            BuildStage::Calendars => "Calendars",
            BuildStage::StoreCleanup => "Store & Cleanup",
        }
    }

    /// The stage after this one; `None` past F.
    pub fn next(&self) -> Option<BuildStage> {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap();
        Self::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ordering() {
        assert!(BuildStage::Configuration < BuildStage::Dimensions);
        assert!(BuildStage::Calendars < BuildStage::StoreCleanup);

        let letters: Vec<char> = BuildStage::ALL.iter().map(|s| s.letter()).collect();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D', 'E', 'F']);
    }

    #[test]
    fn test_next_stops_at_f() {
        assert_eq!(BuildStage::Configuration.next(), Some(BuildStage::Dimensions));
        assert_eq!(BuildStage::StoreCleanup.next(), None);
    }

    #[test]
    fn test_from_letter_is_case_insensitive() {
        assert_eq!(BuildStage::from_letter('c'), Some(BuildStage::Facts));
        assert_eq!(BuildStage::from_letter('X'), None);
    }

    #[test]
    fn test_serializes_as_letter() {
        let json = serde_json::to_string(&BuildStage::LinkTables).unwrap();
        assert_eq!(json, "\"D\"");
        let back: BuildStage = serde_json::from_str("\"D\"").unwrap();
        assert_eq!(back, BuildStage::LinkTables);
    }
}
