//! Lineup command-line front end
//!
//! - **infer**: synthesize a group pattern from sample filenames
//! - **segments**: list unknown filename segments still needing a decision
//! - **validate**: check a saved configuration, optionally against samples
//! - **group**: group a photo set and report role coverage

use anyhow::Result;
use clap::{Parser, Subcommand};
use lineup_logging::{init_logging, LogConfig, LogRing};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "lineup", about = "Group vehicle photos by filename pattern")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Print the last N captured log lines after the command finishes
    #[arg(long, global = true, value_name = "N")]
    log_tail: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Infer a group pattern from sample filenames
    Infer {
        /// Sample filenames (directories are stripped)
        #[arg(required = true)]
        files: Vec<String>,

        /// Segment value that holds the group ID (e.g. ABC123)
        #[arg(long)]
        group_token: String,

        /// Configuration supplying segment labels and custom tokens
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Store the inferred pattern back into the configuration
        #[arg(long, requires = "config")]
        write: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List unknown segments and whether they have been labeled
    Segments {
        /// Sample filenames (directories are stripped)
        #[arg(required = true)]
        files: Vec<String>,

        /// Configuration supplying segment labels and custom tokens
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration's patterns and rules
    Validate {
        /// Configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Sample filenames to run the configuration against
        #[arg(long, num_args = 1..)]
        samples: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Group filenames and assign roles
    Group {
        /// Configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Filenames to group (directories are stripped)
        #[arg(required = true)]
        files: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn command_wants_json(cmd: &Commands) -> bool {
    match cmd {
        Commands::Infer { json, .. } => *json,
        Commands::Segments { json, .. } => *json,
        Commands::Validate { json, .. } => *json,
        Commands::Group { json, .. } => *json,
    }
}

fn run_command(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Infer {
            files,
            group_token,
            config,
            write,
            json,
        } => cli::infer::run(cli::infer::InferArgs {
            files,
            group_token,
            config,
            write,
            json,
        }),

        Commands::Segments { files, config, json } => {
            cli::segments::run(cli::segments::SegmentsArgs { files, config, json })
        }

        Commands::Validate { config, samples, json } => {
            cli::validate::run(cli::validate::ValidateArgs { config, samples, json })
        }

        Commands::Group { config, files, json } => {
            cli::group::run(cli::group::GroupArgs { config, files, json })
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let json_mode = command_wants_json(&cli.command);
    let ring = LogRing::default();
    if let Err(err) = init_logging(LogConfig {
        app_name: "lineup",
        verbose: cli.verbose,
        ring: Some(ring.clone()),
    }) {
        eprintln!("Warning: {:#}", err);
    }

    let result = run_command(cli.command);

    if let Some(n) = cli.log_tail {
        cli::output::print_log_tail(&ring.tail(n));
    }

    match result {
        Ok(code) => code,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
