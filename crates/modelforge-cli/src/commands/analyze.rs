//! Analyze command - show the stored analysis for a processed session.

use std::path::Path;

use super::{print_analysis, resume};

pub fn run(dir: &Path, session: &str, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let builder = resume(dir, session)?;
    let state = builder.session().ok_or("no active session")?;

    let analysis = state.analysis.as_ref().ok_or_else(|| {
        format!(
            "session has no analysis yet; run 'modelforge process {} <input.json>' first",
            session
        )
    })?;

    print_analysis(analysis, verbose);
    Ok(())
}
