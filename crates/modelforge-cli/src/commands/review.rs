//! Review command - submit the approved script to an external reviewer.

use std::path::Path;

use colored::Colorize;
use modelforge::review::ReviewSeverity;
use modelforge::{GeminiReviewer, MockReviewer, ReviewOutcome, ReviewStatus, ScriptReviewer};

use super::resume;

pub fn run(dir: &Path, session: &str, mock: bool) -> Result<(), Box<dyn std::error::Error>> {
    let reviewer: Box<dyn ScriptReviewer> = if mock {
        Box::new(MockReviewer::approving())
    } else {
        Box::new(GeminiReviewer::from_env()?)
    };

    let mut builder = resume(dir, session)?;
    let outcome = builder.request_review(reviewer.as_ref())?;

    match outcome {
        ReviewOutcome::Completed(response) => {
            let verdict = match response.review_status {
                ReviewStatus::Approved => "approved".green().bold(),
                ReviewStatus::IssuesFound => "issues found".yellow().bold(),
            };
            println!(
                "{} {} (score {}/100)",
                "Review:".cyan().bold(),
                verdict,
                response.score
            );
            println!("{}", response.summary);

            for issue in &response.issues {
                let severity = match issue.severity {
                    ReviewSeverity::Critical | ReviewSeverity::High => {
                        format!("{:?}", issue.severity).to_lowercase().red().bold()
                    }
                    _ => format!("{:?}", issue.severity).to_lowercase().yellow(),
                };
                println!();
                println!("  [{}] {} - {}", severity, issue.issue_id, issue.title);
                if let Some(location) = &issue.location {
                    println!("    at {}", location.dimmed());
                }
                println!("    {}", issue.description);
                println!("    {} {}", "Fix:".white().bold(), issue.recommendation);
            }
        }
        ReviewOutcome::Failed(message) => {
            println!(
                "{} {}",
                "Review unavailable:".yellow().bold(),
                message
            );
            println!("{}", "The session is unchanged; you can retry or continue without a review.".dimmed());
        }
    }

    Ok(())
}
