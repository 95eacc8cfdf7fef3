//! Process command - load input and sampled statistics, run analysis.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{print_analysis, resume};

pub fn run(
    dir: &Path,
    session: &str,
    input: PathBuf,
    samples: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&input)?)?;

    let sample_values: Vec<Value> = match samples {
        Some(path) => {
            let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
            parsed
                .as_array()
                .cloned()
                .ok_or_else(|| format!("{} must contain a JSON array", path.display()))?
        }
        None => Vec::new(),
    };

    let mut builder = resume(dir, session)?;
    let analysis = builder.process_input(&raw, &sample_values)?;
    print_analysis(analysis, verbose);
    Ok(())
}
