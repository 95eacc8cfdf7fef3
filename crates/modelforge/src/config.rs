//! Build configuration for script generation.

use serde::{Deserialize, Serialize};

use crate::error::{ModelForgeError, Result};

/// Language used for localized calendar month names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarLanguage {
    English,
    German,
}

impl CalendarLanguage {
    /// Full month names, January through December.
    pub fn month_names(&self) -> [&'static str; 12] {
        match self {
            CalendarLanguage::English => [
                "January", "February", "March", "April", "May", "June", "July", "August",
                "September", "October", "November", "December",
            ],
            CalendarLanguage::German => [
                "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August",
                "September", "Oktober", "November", "Dezember",
            ],
        }
    }

    /// Abbreviated month names used in SET MonthNames directives.
    pub fn month_abbreviations(&self) -> [&'static str; 12] {
        match self {
            CalendarLanguage::English => [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ],
            CalendarLanguage::German => [
                "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
            ],
        }
    }
}

impl Default for CalendarLanguage {
    fn default() -> Self {
        CalendarLanguage::English
    }
}

/// Strategy for generating link-table keys in stage D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// Concatenate linking fields with a separator.
    Composite,
    /// Wrap the composite in AutoNumber() for a surrogate integer key.
    Surrogate,
}

impl Default for KeyStrategy {
    fn default() -> Self {
        KeyStrategy::Composite
    }
}

/// Configuration for script generation.
///
/// Mutable only while no stage has been approved; the orchestrator rejects
/// changes after the first approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Project name used in the stage A header.
    pub project_name: String,
    /// Source path prefix, e.g. `lib://data`.
    pub path_prefix: String,
    /// Language for generated calendar month names.
    pub calendar_language: CalendarLanguage,
    /// Key generation strategy for link tables.
    pub key_strategy: KeyStrategy,
}

impl BuildConfig {
    /// Create a configuration with defaults for everything but the project name.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            path_prefix: "lib://data".to_string(),
            calendar_language: CalendarLanguage::default(),
            key_strategy: KeyStrategy::default(),
        }
    }

    /// Set the source path prefix.
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Set the calendar language.
    pub fn with_calendar_language(mut self, language: CalendarLanguage) -> Self {
        self.calendar_language = language;
        self
    }

    /// Set the key generation strategy.
    pub fn with_key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    /// Check the configuration for values that would corrupt generated scripts.
    pub fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            return Err(ModelForgeError::Config(
                "project name must not be empty".to_string(),
            ));
        }
        if self.path_prefix.trim().is_empty() {
            return Err(ModelForgeError::Config(
                "path prefix must not be empty".to_string(),
            ));
        }
        if self.path_prefix.ends_with('/') {
            return Err(ModelForgeError::Config(format!(
                "path prefix '{}' must not end with a slash",
                self.path_prefix
            )));
        }
        Ok(())
    }

    /// The "Final" sub-path stage F stores finished tables into.
    pub fn final_path(&self) -> String {
        format!("{}/Final", self.path_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BuildConfig::new("Sales");
        assert!(config.validate().is_ok());
        assert_eq!(config.final_path(), "lib://data/Final");
    }

    #[test]
    fn test_rejects_empty_project_name() {
        let config = BuildConfig::new("  ");
        assert!(matches!(
            config.validate(),
            Err(ModelForgeError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_trailing_slash() {
        let config = BuildConfig::new("Sales").with_path_prefix("lib://data/");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_month_names_localized() {
        assert_eq!(CalendarLanguage::English.month_names()[0], "January");
        assert_eq!(CalendarLanguage::German.month_names()[2], "März");
    }
}
