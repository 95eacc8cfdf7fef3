//! Reviewer trait and configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::types::{ReviewRequest, ReviewResponse};

/// How many times a reviewer may be asked before the request fails.
pub const MAX_REVIEW_ATTEMPTS: u32 = 3;

/// Configuration shared by reviewer implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerConfig {
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens in the reviewer's response.
    pub max_output_tokens: u32,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-pro".to_string(),
            temperature: 0.2,
            max_output_tokens: 4096,
        }
    }
}

/// A script reviewer: takes an assembled script plus model context and
/// returns a structured verdict.
pub trait ScriptReviewer: Send + Sync {
    /// Reviewer name for session history, e.g. "gemini".
    fn name(&self) -> &str;

    /// Review a script. Errors describe transport or parse failures, never
    /// negative verdicts; a script with problems comes back as
    /// `ReviewStatus::IssuesFound`.
    fn review(&self, request: &ReviewRequest) -> Result<ReviewResponse>;
}
