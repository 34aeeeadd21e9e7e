use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use flowcov::cli::{cmd_ingest, cmd_merge, cmd_report, cmd_reset, cmd_summary};
use flowcov::filter::FilterSpec;
use flowcov::writers::Format;

/// flowcov — Process execution coverage merging and reporting.
#[derive(Parser)]
#[command(name = "flowcov", version, about)]
struct Cli {
    /// Path to the stats snapshot (default: ./.flowcov.bin)
    #[arg(long, global = true, default_value = ".flowcov.bin")]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge one sampling pass (a JSON stats dump) into the snapshot.
    Ingest {
        /// Path to the sampled stats file.
        samples: PathBuf,
    },

    /// Fold another snapshot into this one (summing execution counts).
    Merge {
        /// Path to the snapshot to merge in.
        other: PathBuf,
    },

    /// Print coverage totals from the snapshot.
    Summary {
        /// Only count activities whose name matches this pattern.
        #[arg(long)]
        include: Option<String>,

        /// Skip activities whose name matches this pattern.
        #[arg(long)]
        exclude: Option<String>,
    },

    /// Render a coverage report from the snapshot.
    Report {
        /// Output format (text, csv, xml).
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Only report activities whose name matches this pattern.
        #[arg(long)]
        include: Option<String>,

        /// Skip activities whose name matches this pattern.
        #[arg(long)]
        exclude: Option<String>,
    },

    /// Delete the snapshot file.
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let out = match cli.command {
        Commands::Ingest { samples } => {
            cmd_ingest(&cli.snapshot, &samples).context("Failed to ingest samples")?
        }
        Commands::Merge { other } => {
            cmd_merge(&cli.snapshot, &other).context("Failed to merge snapshots")?
        }
        Commands::Summary { include, exclude } => {
            cmd_summary(&cli.snapshot, &FilterSpec { include, exclude })?
        }
        Commands::Report {
            format,
            output,
            include,
            exclude,
        } => {
            let format = format.parse::<Format>()?;
            cmd_report(
                &cli.snapshot,
                format,
                output.as_deref(),
                &FilterSpec { include, exclude },
            )?
        }
        Commands::Reset => cmd_reset(&cli.snapshot)?,
    };

    print!("{out}");
    Ok(())
}
