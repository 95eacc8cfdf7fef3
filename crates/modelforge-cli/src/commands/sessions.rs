//! Sessions command - list stored sessions.

use std::path::Path;

use colored::Colorize;
use modelforge::{ModelBuilder, SessionStore};

pub fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let builder = ModelBuilder::new(SessionStore::new(dir));
    let ids = builder.list_sessions()?;

    if ids.is_empty() {
        println!(
            "No sessions in {}. Start one with {}.",
            dir.display(),
            "modelforge new <project>".cyan()
        );
        return Ok(());
    }

    println!("{}", "Sessions".cyan().bold());
    for id in ids {
        println!("  {}", id);
    }
    Ok(())
}
