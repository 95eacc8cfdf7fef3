//! Review request/response types shared by all reviewer implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::ModelType;

/// Overall verdict of a script review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    IssuesFound,
}

/// Severity of a single review finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSeverity {
    Critical,
    High,
    Medium,
    Low,
}

/// A script submitted for review, with enough model context for the
/// reviewer to judge structural choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// The assembled script text.
    pub script: String,
    /// Model type the script implements.
    pub model_type: ModelType,
    /// Number of fact tables in the model.
    pub facts_count: usize,
    /// Number of dimension tables in the model.
    pub dimensions_count: usize,
    /// Total source row count across all tables.
    pub expected_rows: u64,
}

/// One finding from a reviewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewIssue {
    /// Stable identifier, e.g. "ISSUE-001".
    pub issue_id: String,
    pub severity: ReviewSeverity,
    /// Free-form category, e.g. "performance" or "correctness".
    pub category: String,
    pub title: String,
    /// Where in the script the issue sits, e.g. a table or stage name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub description: String,
    pub recommendation: String,
    /// Corrected script snippet, when the reviewer supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_example: Option<String>,
}

/// A reviewer's full response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub review_status: ReviewStatus,
    /// Quality score, 0-100.
    pub score: u8,
    #[serde(default)]
    pub issues: Vec<ReviewIssue>,
    pub summary: String,
}

/// A review outcome as recorded in session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub requested_at: DateTime<Utc>,
    /// Which reviewer produced this, e.g. "gemini" or "mock".
    pub provider: String,
    pub status: ReviewStatus,
    pub score: u8,
    pub issue_count: usize,
    pub summary: String,
}

impl ReviewRecord {
    pub fn from_response(provider: impl Into<String>, response: &ReviewResponse) -> Self {
        Self {
            requested_at: Utc::now(),
            provider: provider.into(),
            status: response.review_status,
            score: response.score,
            issue_count: response.issues.len(),
            summary: response.summary.clone(),
        }
    }
}
