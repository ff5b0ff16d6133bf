// tutelle/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing) on stderr, stdout carries the JSON output
    // RUST_LOG=debug tutelle evaluate ... pour voir chaque règle appliquée
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { project_dir } => commands::check::execute(project_dir),
        Commands::Evaluate {
            project_dir,
            who,
            record,
            entity,
        } => commands::evaluate::execute(project_dir, who, record, entity),
        Commands::Scope {
            project_dir,
            who,
            entity,
            format,
        } => commands::scope::execute(project_dir, who, entity, format),
        Commands::List {
            project_dir,
            who,
            entity,
        } => commands::list::execute(project_dir, who, entity).await,
        Commands::Matrix {
            project_dir,
            format,
            check,
        } => commands::matrix::execute(project_dir, format, check),
        Commands::Authorize {
            project_dir,
            who,
            capability,
        } => commands::authorize::execute(project_dir, who, capability),
        Commands::Init {
            project_dir,
            name,
            force,
        } => commands::init::execute(project_dir, name, force),
    }
}
