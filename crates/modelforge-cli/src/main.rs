//! ModelForge CLI - staged data-warehouse model builder.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::New {
            project,
            path_prefix,
            language,
            keys,
        } => commands::new::run(&cli.dir, project, path_prefix, language, keys),

        Commands::Process {
            session,
            input,
            samples,
        } => commands::process::run(&cli.dir, &session, input, samples, cli.verbose),

        Commands::Analyze { session } => commands::analyze::run(&cli.dir, &session, cli.verbose),

        Commands::ModelType { session, model } => {
            commands::model_type::run(&cli.dir, &session, model)
        }

        Commands::Build { session } => commands::build::run(&cli.dir, &session),

        Commands::Approve { session, script } => {
            commands::approve::run(&cli.dir, &session, script)
        }

        Commands::Back { session, stage } => commands::back::run(&cli.dir, &session, stage),

        Commands::Review { session, mock } => commands::review::run(&cli.dir, &session, mock),

        Commands::Export { session, output } => commands::export::run(&cli.dir, &session, output),

        Commands::Status { session, json } => commands::status::run(&cli.dir, &session, json),

        Commands::Sessions => commands::sessions::run(&cli.dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
