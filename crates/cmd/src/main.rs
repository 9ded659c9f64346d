// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands;
use cmd::common::get_data_dir_with_override;
use retention::counts::{DEFAULT_PRIMARY_KEY, DEFAULT_SECONDARY_KEY};
use retention::randomize::DEFAULT_PRESERVE;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "retention")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (when RETENTION_LOG is not set)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge day and week retention reports into basic and expanded tables
    Union {
        /// Directory of source reports (defaults to $RETENTION_DATA)
        data_dir: Option<PathBuf>,

        /// Directory for the merged outputs (defaults to the data directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// YAML pipeline configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Copy nightly count fields onto matching release records
    Combine {
        /// Primary (release) counts report
        primary: PathBuf,
        /// Secondary (nightly) counts report
        secondary: PathBuf,
        /// Output path
        output: PathBuf,

        #[arg(long, default_value = DEFAULT_PRIMARY_KEY)]
        primary_key: String,

        #[arg(long, default_value = DEFAULT_SECONDARY_KEY)]
        secondary_key: String,
    },
    /// Render a JSON report as CSV
    Csv {
        input: PathBuf,
        output: PathBuf,
    },
    /// Write a copy of a report with randomized values
    Randomize {
        input: PathBuf,

        /// Output path (defaults to <input>-randomized.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field left untouched
        #[arg(long, default_value = DEFAULT_PRESERVE)]
        preserve: String,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose && std::env::var_os(diagnostics::LOG_ENV).is_none() {
        diagnostics::init_with_level("debug");
    } else {
        diagnostics::init_diagnostics();
    }

    let mut stdout = std::io::stdout().lock();
    let mut lines = Vec::new();
    let output = |line: String| lines.push(line);

    let result = match cli.command {
        Commands::Union {
            data_dir,
            out_dir,
            config,
        } => {
            let data_dir = get_data_dir_with_override(data_dir)?;
            commands::union_command(&data_dir, out_dir.as_deref(), config.as_deref(), output)
        }
        Commands::Combine {
            primary,
            secondary,
            output: output_path,
            primary_key,
            secondary_key,
        } => commands::combine_command(
            &primary,
            &secondary,
            &output_path,
            &primary_key,
            &secondary_key,
            output,
        ),
        Commands::Csv {
            input,
            output: output_path,
        } => commands::csv_command(&input, &output_path, output),
        Commands::Randomize {
            input,
            output: output_path,
            preserve,
            seed,
        } => commands::randomize_command(&input, output_path.as_deref(), &preserve, seed, output),
    };

    for line in &lines {
        writeln!(stdout, "{line}")?;
    }

    if let Err(e) = &result {
        diagnostics::log_error!("Command failed: {error}", error: format!("{e:#}"));
    }
    result
}
