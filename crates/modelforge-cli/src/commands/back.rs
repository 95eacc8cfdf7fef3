//! Back command - roll the session back to an earlier stage.

use std::path::Path;

use colored::Colorize;
use modelforge::BuildStage;

use super::resume;

pub fn run(dir: &Path, session: &str, stage: char) -> Result<(), Box<dyn std::error::Error>> {
    let target = BuildStage::from_letter(stage)
        .ok_or_else(|| format!("'{}' is not a stage letter (A-F)", stage))?;

    let mut builder = resume(dir, session)?;
    builder.go_back_to_stage(target)?;

    println!(
        "{} {} - {}",
        "Rolled back to stage".yellow().bold(),
        target.to_string().white().bold(),
        target.title()
    );
    println!("{}", "Approvals for this stage and later were discarded.".dimmed());
    Ok(())
}
