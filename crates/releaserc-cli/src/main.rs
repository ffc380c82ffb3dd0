//! releaserc CLI tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "releaserc")]
#[command(about = "Validate and inspect release pipeline configuration", long_about = None)]
struct Cli {
    /// Release configuration file (discovered in the current directory if omitted)
    #[arg(long, global = true, env = "RELEASERC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the release configuration
    Validate,
    /// Show branches and the resolved stage pipeline as JSON
    Plan,
    /// Check whether a branch may trigger a release
    CheckBranch {
        /// Branch name (detected from CI variables or git if omitted)
        branch: Option<String>,
    },
    /// Render the commit-back message for a release
    RenderMessage {
        /// Version being released
        #[arg(long)]
        next_version: String,
        /// Release notes
        #[arg(long, default_value = "")]
        notes: String,
        /// Template to render instead of the configured message
        #[arg(long)]
        template: Option<String>,
    },
    /// Walk the pipeline stage by stage without side effects
    Preview {
        /// Version being released
        #[arg(long)]
        next_version: String,
        /// Release notes
        #[arg(long, default_value = "")]
        notes: String,
        /// Branch to release from (detected if omitted)
        #[arg(long)]
        branch: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Validate => {
            commands::validate(config)?;
        }
        Commands::Plan => {
            commands::plan(config)?;
        }
        Commands::CheckBranch { branch } => {
            commands::check_branch(config, branch)?;
        }
        Commands::RenderMessage {
            next_version,
            notes,
            template,
        } => {
            commands::render_message(config, &next_version, &notes, template)?;
        }
        Commands::Preview {
            next_version,
            notes,
            branch,
        } => {
            commands::preview::run_preview(config, &next_version, &notes, branch).await?;
        }
    }

    Ok(())
}
