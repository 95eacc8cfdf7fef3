//! Build command - preview the current stage's script.

use std::path::Path;

use colored::Colorize;

use super::resume;

pub fn run(dir: &Path, session: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = resume(dir, session)?;
    let built = builder.build_current_stage()?;

    println!(
        "{} {} - {} ({} lines)",
        "Stage".cyan().bold(),
        built.stage.to_string().white().bold(),
        built.stage.title(),
        built.estimated_lines
    );
    if !built.tables_included.is_empty() {
        println!("Tables: {}", built.tables_included.join(", ").dimmed());
    }
    println!();
    println!("{}", built.script);
    println!(
        "{}",
        format!("Run 'modelforge approve {}' to accept this stage.", session).dimmed()
    );
    Ok(())
}
