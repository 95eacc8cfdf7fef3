//! Export command - write the Stage 2 output.

use std::path::{Path, PathBuf};

use colored::Colorize;

use super::resume;

pub fn run(
    dir: &Path,
    session: &str,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let builder = resume(dir, session)?;
    let stage2 = builder.export_output()?;
    let json = serde_json::to_string_pretty(&stage2)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json)?;
            println!(
                "{} {} ({} facts, {} dimensions, {} calendars)",
                "Wrote".green().bold(),
                path.display().to_string().white().bold(),
                stage2.facts.len(),
                stage2.dimensions.len(),
                stage2.calendars.len()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
