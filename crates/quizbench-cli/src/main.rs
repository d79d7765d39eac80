//! quizbench CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "quizbench",
    version,
    about = "Question-bank accuracy evaluator for answer services"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit every question to the service and report running accuracy
    Run {
        /// Line-delimited JSON question bank (default: ./question_bank.json)
        #[arg(long)]
        question_bank: Option<PathBuf>,

        /// Answer service URL (default: http://localhost:8080)
        #[arg(long)]
        endpoint: Option<String>,

        /// Delay between transport retries in milliseconds
        #[arg(long)]
        retry_delay_ms: Option<u64>,

        /// Give up on a question after this many attempts (default: never)
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Per-request timeout in seconds (default: none)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check that every line of a question bank decodes
    Validate {
        /// Line-delimited JSON question bank (default: ./question_bank.json)
        #[arg(long)]
        question_bank: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizbench=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            question_bank,
            endpoint,
            retry_delay_ms,
            max_attempts,
            timeout_secs,
            config,
        } => {
            commands::run::execute(
                question_bank,
                endpoint,
                retry_delay_ms,
                max_attempts,
                timeout_secs,
                config,
            )
            .await
        }
        Commands::Validate {
            question_bank,
            format,
            config,
        } => commands::validate::execute(question_bank, format, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
