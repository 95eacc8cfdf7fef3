//! Mock reviewer for tests and offline runs.

use crate::error::{ModelForgeError, Result};

use super::provider::ScriptReviewer;
use super::types::{ReviewIssue, ReviewRequest, ReviewResponse, ReviewSeverity, ReviewStatus};

/// Mock reviewer with a scripted verdict.
pub struct MockReviewer {
    response: ReviewResponse,
    fail: bool,
}

impl MockReviewer {
    /// A reviewer that approves everything with a high score.
    pub fn approving() -> Self {
        Self {
            response: ReviewResponse {
                review_status: ReviewStatus::Approved,
                score: 95,
                issues: Vec::new(),
                summary: "Structure is sound; keys link cleanly.".to_string(),
            },
            fail: false,
        }
    }

    /// A reviewer that reports one medium-severity issue.
    pub fn with_issues() -> Self {
        Self {
            response: ReviewResponse {
                review_status: ReviewStatus::IssuesFound,
                score: 62,
                issues: vec![ReviewIssue {
                    issue_id: "ISSUE-001".to_string(),
                    severity: ReviewSeverity::Medium,
                    category: "performance".to_string(),
                    title: "Non-optimized load".to_string(),
                    location: None,
                    description: "A transformation on load prevents QVD-optimized reads."
                        .to_string(),
                    recommendation: "Move the transformation to a resident pass.".to_string(),
                    fix_example: None,
                }],
                summary: "One performance issue found.".to_string(),
            },
            fail: false,
        }
    }

    /// A reviewer whose every attempt errors.
    pub fn failing() -> Self {
        Self {
            response: ReviewResponse {
                review_status: ReviewStatus::Approved,
                score: 0,
                issues: Vec::new(),
                summary: String::new(),
            },
            fail: true,
        }
    }

    /// A reviewer returning an exact scripted response.
    pub fn with_response(response: ReviewResponse) -> Self {
        Self {
            response,
            fail: false,
        }
    }
}

impl ScriptReviewer for MockReviewer {
    fn name(&self) -> &str {
        "mock"
    }

    fn review(&self, _request: &ReviewRequest) -> Result<ReviewResponse> {
        if self.fail {
            return Err(ModelForgeError::Config(
                "mock reviewer configured to fail".to_string(),
            ));
        }
        Ok(self.response.clone())
    }
}
