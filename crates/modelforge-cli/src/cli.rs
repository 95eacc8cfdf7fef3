//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use modelforge::{CalendarLanguage, KeyStrategy, ModelType};

/// ModelForge: staged data-warehouse model builder
#[derive(Parser)]
#[command(name = "modelforge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Session store directory
    #[arg(long, global = true, default_value = ".modelforge")]
    pub dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new build session
    New {
        /// Project name
        #[arg(value_name = "PROJECT")]
        project: String,

        /// Source path prefix for QVD files
        #[arg(long, default_value = "lib://data")]
        path_prefix: String,

        /// Calendar month-name language
        #[arg(long, value_enum, default_value = "english")]
        language: LanguageChoice,

        /// Link-table key strategy
        #[arg(long, value_enum, default_value = "composite")]
        keys: KeyChoice,
    },

    /// Process structural input and sampled statistics into a session
    Process {
        /// Session id
        #[arg(value_name = "SESSION")]
        session: String,

        /// Path to the structural input JSON
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Path to a JSON array of sampled table statistics
        #[arg(short, long)]
        samples: Option<PathBuf>,
    },

    /// Show the stored analysis for a processed session
    Analyze {
        /// Session id
        #[arg(value_name = "SESSION")]
        session: String,
    },

    /// Explicitly choose the model type
    ModelType {
        /// Session id
        #[arg(value_name = "SESSION")]
        session: String,

        /// Model type to build
        #[arg(value_enum, value_name = "TYPE")]
        model: ModelChoice,
    },

    /// Build the current stage and print its script without approving
    Build {
        /// Session id
        #[arg(value_name = "SESSION")]
        session: String,
    },

    /// Build, validate, and approve the current stage
    Approve {
        /// Session id
        #[arg(value_name = "SESSION")]
        session: String,

        /// Approve this edited script file instead of the generated fragment
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,
    },

    /// Roll back to an earlier stage, discarding it and everything after
    Back {
        /// Session id
        #[arg(value_name = "SESSION")]
        session: String,

        /// Stage letter to return to (A-F)
        #[arg(value_name = "STAGE")]
        stage: char,
    },

    /// Submit the approved script to the external reviewer
    Review {
        /// Session id
        #[arg(value_name = "SESSION")]
        session: String,

        /// Use the offline mock reviewer instead of Gemini
        #[arg(long)]
        mock: bool,
    },

    /// Export the model as Stage 2 JSON
    Export {
        /// Session id
        #[arg(value_name = "SESSION")]
        session: String,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show session progress and analysis summary
    Status {
        /// Session id
        #[arg(value_name = "SESSION")]
        session: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored sessions
    Sessions,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LanguageChoice {
    English,
    German,
}

impl From<LanguageChoice> for CalendarLanguage {
    fn from(choice: LanguageChoice) -> Self {
        match choice {
            LanguageChoice::English => CalendarLanguage::English,
            LanguageChoice::German => CalendarLanguage::German,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KeyChoice {
    Composite,
    Surrogate,
}

impl From<KeyChoice> for KeyStrategy {
    fn from(choice: KeyChoice) -> Self {
        match choice {
            KeyChoice::Composite => KeyStrategy::Composite,
            KeyChoice::Surrogate => KeyStrategy::Surrogate,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModelChoice {
    StarSchema,
    Snowflake,
    LinkTable,
    Concatenated,
}

impl From<ModelChoice> for ModelType {
    fn from(choice: ModelChoice) -> Self {
        match choice {
            ModelChoice::StarSchema => ModelType::StarSchema,
            ModelChoice::Snowflake => ModelType::Snowflake,
            ModelChoice::LinkTable => ModelType::LinkTable,
            ModelChoice::Concatenated => ModelType::Concatenated,
        }
    }
}
