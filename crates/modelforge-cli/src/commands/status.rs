//! Status command - show session progress and analysis summary.

use std::path::Path;

use colored::Colorize;
use modelforge::BuildStage;

use super::resume;

pub fn run(dir: &Path, session: &str, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let builder = resume(dir, session)?;
    let state = builder.session().ok_or("no active session")?;

    if json_output {
        let status = serde_json::json!({
            "id": state.id,
            "project": state.project_name,
            "created_at": state.created_at,
            "updated_at": state.updated_at,
            "current_stage": state.current_stage,
            "completed_stages": state.completed_stages,
            "model_type": state.effective_model_type().map(|m| m.label()),
            "tables": state.spec.as_ref().map(|s| s.tables.len()).unwrap_or(0),
            "reviews": state.review_history.len(),
            "finished": state.is_finished(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        "Session".cyan().bold(),
        state.id.white().bold(),
        state.project_name
    );
    println!();

    for stage in BuildStage::ALL {
        let marker = if state.is_completed(stage) {
            "✓".green().bold()
        } else if stage == state.current_stage && !state.is_finished() {
            "→".cyan().bold()
        } else {
            "·".dimmed()
        };
        println!("  {} {} - {}", marker, stage, stage.title());
    }
    println!();

    match state.effective_model_type() {
        Some(model) => {
            let origin = if state.model_type.is_some() {
                "selected"
            } else {
                "recommended"
            };
            println!(
                "Model type: {} ({})",
                model.label().white().bold(),
                origin
            );
        }
        None => println!("Model type: {}", "not yet determined".dimmed()),
    }

    if let Some(spec) = &state.spec {
        println!(
            "Input: {} tables, {} relationships, {} date fields",
            spec.tables.len(),
            spec.relationships.len(),
            spec.date_fields.len()
        );
    } else {
        println!(
            "Input: {} (run {})",
            "not processed".dimmed(),
            format!("modelforge process {} <input.json>", state.id).cyan()
        );
    }

    if let Some(last) = state.review_history.last() {
        println!(
            "Last review: {:?} ({}/100) via {}",
            last.status, last.score, last.provider
        );
    }

    if state.is_finished() {
        println!();
        println!("{}", "All stages approved; ready to export.".green().bold());
    }
    Ok(())
}
