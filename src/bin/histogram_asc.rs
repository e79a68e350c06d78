use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env};

use ascflim::{accumulate_directory, HistogramParams};

/// Merge data from a directory of exports into a single
/// histogram and report summary statistics.
#[derive(Parser)]
#[command(name = "histogram_asc", version,
    about = "Merge data from a directory into a single histogram")]
struct Cli {
    /// Path from which to search for input files
    directory : PathBuf,

    /// Recurse into subdirectories, otherwise only process the
    /// top level
    #[arg(short, long)]
    recursive : bool,

    /// Suffix to consider for input files; repeat for several
    #[arg(long = "suffix", default_value = "_color coded value.asc")]
    suffixes : Vec<String>,

    /// Lower edge of the histogrammed range
    #[arg(long, default_value_t = 0.0)]
    min : f64,

    /// Upper edge of the histogrammed range
    #[arg(long, default_value_t = 4000.0)]
    max : f64,

    /// Width of one histogram bin
    #[arg(long, default_value_t = 10.0)]
    binwidth : f64,

    /// Histogram log10 of values instead of values; useful for
    /// free-bound ratios
    #[arg(long)]
    log : bool,

    /// Stem for saving histogram data as .hist/.bins/.width
    #[arg(long = "savehist", value_name = "STEM")]
    save_hist : Option<PathBuf>,

    /// Print details of file operations
    #[arg(long)]
    verbose : bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let params = HistogramParams {
        min : cli.min,
        max : cli.max,
        binwidth : cli.binwidth,
        log10 : cli.log,
    };

    let histogram = match accumulate_directory(
        &cli.directory, &cli.suffixes, cli.recursive, &params) {
        Ok(histogram) => histogram,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    let stats = histogram.stats();
    println!("total counts: {}", histogram.total());
    println!("mean: {:.2}", stats.mean);
    println!("standard deviation: {:.2}", stats.stddev);
    for &(fraction, value) in &stats.percentiles {
        println!("{}th percentile: {:.2}", (fraction * 100.0).round() as u32, value);
    }

    if let Some(stem) = cli.save_hist {
        if let Err(err) = histogram.save(&stem, false) {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
