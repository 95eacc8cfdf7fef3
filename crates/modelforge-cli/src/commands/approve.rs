//! Approve command - build, validate, and lock in the current stage.

use std::path::{Path, PathBuf};

use colored::Colorize;

use super::resume;

pub fn run(
    dir: &Path,
    session: &str,
    script: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = resume(dir, session)?;
    let edited = match script {
        Some(path) => Some(std::fs::read_to_string(&path)?),
        None => None,
    };
    let built = builder.approve_current_stage(edited)?;

    println!(
        "{} {} - {}",
        "Approved stage".green().bold(),
        built.stage.to_string().white().bold(),
        built.stage.title()
    );

    let state = builder
        .session()
        .ok_or("session disappeared after approval")?;
    if state.is_finished() {
        println!(
            "{} Run {} to produce the Stage 2 output.",
            "All stages approved.".green(),
            format!("modelforge export {}", session).cyan()
        );
    } else {
        println!(
            "Next stage: {} - {}",
            state.current_stage.to_string().white().bold(),
            state.current_stage.title()
        );
    }
    Ok(())
}
