use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "complyd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Task compliance workflow engine", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a workflow through all phases from a bundle directory
    Run {
        /// Directory holding task.yaml and per-phase artifact files
        bundle: PathBuf,
    },

    /// Preview the features the keyword extractor raises for a request
    Extract {
        /// Request text
        text: Option<String>,

        /// Read the request from a file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Validate an architecture profile file
    CheckProfile {
        /// Profile YAML path
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { bundle } => complyd::cli::run::run(&bundle),
        Commands::Extract { text, file } => {
            complyd::cli::extract::run(text.as_deref(), file.as_deref())
        }
        Commands::CheckProfile { path } => complyd::cli::profile::run(&path),
    };

    if let Err(err) = result {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
