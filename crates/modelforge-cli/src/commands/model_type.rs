//! Model-type command - explicitly choose the modeling pattern.

use std::path::Path;

use colored::Colorize;
use modelforge::ModelType;

use super::resume;
use crate::cli::ModelChoice;

pub fn run(dir: &Path, session: &str, model: ModelChoice) -> Result<(), Box<dyn std::error::Error>> {
    let model: ModelType = model.into();

    let mut builder = resume(dir, session)?;
    builder.select_model_type(model)?;

    println!(
        "{} {}",
        "Model type set to".green().bold(),
        model.label().white().bold()
    );
    Ok(())
}
