use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env};

use ascflim::{threshold_related, ThresholdOptions};

/// Threshold raw FLIM exports to limit them to pixels which
/// have sane fits.
#[derive(Parser)]
#[command(name = "threshold_asc", version,
    about = "Threshold raw FLIM exports to limit to pixels which have sane fits")]
struct Cli {
    /// Path to any ASC file of the related set
    input : PathBuf,

    /// Output file, or directory to output to with --suffix
    out : PathBuf,

    /// Re-binning half-window for photon counts
    #[arg(long = "bh-bin", value_name = "N")]
    bh_bin : usize,

    /// Suffix for output files if OUT is a directory
    #[arg(long, default_value = ".th.asc")]
    suffix : String,

    /// Print details of file operations
    #[arg(long)]
    verbose : bool,

    /// Don't write to output files
    #[arg(long)]
    dry_run : bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let options = ThresholdOptions {
        half_window : cli.bh_bin,
        suffix : cli.suffix,
        dry_run : cli.dry_run,
        ..ThresholdOptions::default()
    };

    match threshold_related(&cli.input, &cli.out, &options) {
        Ok(written) => {
            for path in written {
                println!("{}", path.display());
            }
        },
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
