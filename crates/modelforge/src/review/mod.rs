//! External script review: the reviewer trait, the Gemini implementation,
//! and a mock for tests.

pub mod gemini;
pub mod mock;
pub mod prompts;
pub mod provider;
pub mod types;

pub use gemini::GeminiReviewer;
pub use mock::MockReviewer;
pub use provider::{ReviewerConfig, ScriptReviewer, MAX_REVIEW_ATTEMPTS};
pub use types::{
    ReviewIssue, ReviewRecord, ReviewRequest, ReviewResponse, ReviewSeverity, ReviewStatus,
};
