//! CLI command implementations.

pub mod analyze;
pub mod approve;
pub mod back;
pub mod build;
pub mod export;
pub mod model_type;
pub mod new;
pub mod process;
pub mod review;
pub mod sessions;
pub mod status;

use std::path::Path;

use colored::Colorize;
use modelforge::{AnalysisResult, ModelBuilder, SessionStore};

/// Open the store at `dir` and resume `session` into a ready builder.
pub fn resume(dir: &Path, session: &str) -> Result<ModelBuilder, Box<dyn std::error::Error>> {
    let mut builder = ModelBuilder::new(SessionStore::new(dir));
    builder.resume_session(session)?;
    Ok(builder)
}

/// Print classifications, recommendation, warnings, and guidance.
pub fn print_analysis(analysis: &AnalysisResult, verbose: bool) {
    println!("{}", "Table classifications".cyan().bold());
    for result in analysis.classifications.values() {
        println!(
            "  {} {} ({:.0}%)",
            result.table_name.white().bold(),
            format!("{:?}", result.classification).to_lowercase(),
            result.confidence * 100.0
        );
        if verbose {
            for reason in &result.reasoning {
                println!("      - {}", reason.dimmed());
            }
        }
    }

    let rec = &analysis.model_recommendation;
    println!();
    println!(
        "{} {} ({:.0}%)",
        "Recommended model:".cyan().bold(),
        rec.recommended_model.label().white().bold(),
        rec.confidence * 100.0
    );
    if verbose {
        for alt in &rec.alternatives {
            println!("  alternative: {} - {}", alt.model.label(), alt.reason.dimmed());
        }
    }

    if !analysis.warnings.is_empty() {
        println!();
        println!("{}", "Warnings".yellow().bold());
        for warning in &analysis.warnings {
            println!("  {} {}", "!".yellow(), warning.message);
            if let Some(suggestion) = &warning.suggestion {
                println!("    {}", suggestion.dimmed());
            }
        }
    }

    for recommendation in &analysis.recommendations {
        println!();
        println!("{} {}", "Hint:".blue().bold(), recommendation);
    }
}
