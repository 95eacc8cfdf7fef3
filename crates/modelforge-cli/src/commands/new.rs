//! New command - start a build session.

use std::path::Path;

use colored::Colorize;
use modelforge::{BuildConfig, ModelBuilder, SessionStore};

use crate::cli::{KeyChoice, LanguageChoice};

pub fn run(
    dir: &Path,
    project: String,
    path_prefix: String,
    language: LanguageChoice,
    keys: KeyChoice,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = BuildConfig::new(project)
        .with_path_prefix(path_prefix)
        .with_calendar_language(language.into())
        .with_key_strategy(keys.into());

    let mut builder = ModelBuilder::new(SessionStore::new(dir));
    let session = builder.start_session(config)?;

    println!(
        "{} {}",
        "Created session".green().bold(),
        session.id.white().bold()
    );
    println!(
        "Next: {} then {}",
        format!("modelforge process {} <input.json>", session.id).cyan(),
        format!("modelforge approve {}", session.id).cyan()
    );
    Ok(())
}
