//! Fixed-range value histograms over grid exports, accumulated
//! one file at a time and summed across whole directories.
//!
//! Per-file histograms are independent, so a directory sweep is
//! an embarrassingly parallel map-reduce: each file produces a
//! partial histogram and the partials merge by elementwise
//! addition, with no ordering requirement.

use std::path::{Path, PathBuf};

use itertools::izip;
use ndarray::Array1;
use rayon::prelude::*;

use crate::data::grid;
use crate::utils::DatasetError;
use crate::walk;

/// Binning parameters for one histogram sweep.
#[derive(Debug, Clone)]
pub struct HistogramParams {
    pub min : f64,
    pub max : f64,
    pub binwidth : f64,
    /// Histogram log10 of the values instead of the values.
    /// Useful for free/bound ratios, whose mass sits within a
    /// few decades of 1.
    pub log10 : bool,
}

impl Default for HistogramParams {
    fn default() -> Self {
        HistogramParams {
            min : 0.0,
            max : 4000.0,
            binwidth : 10.0,
            log10 : false,
        }
    }
}

impl HistogramParams {
    /// The histogrammed interval, after the optional log
    /// transform. Non-positive endpoints clamp to 1e-16 before
    /// the transform so ratio sweeps can keep the 0 default.
    fn bounds(&self) -> (f64, f64) {
        if self.log10 {
            (self.min.max(1e-16).log10(), self.max.max(1e-16).log10())
        } else {
            (self.min, self.max)
        }
    }

    fn n_bins(&self) -> usize {
        let (lo, hi) = self.bounds();
        ((hi - lo) / self.binwidth).round() as usize + 1
    }
}

/// One accumulating histogram: per-bin counts over a fixed,
/// uniformly binned range. Values outside the range are
/// dropped, as are non-positive values in a log sweep.
#[derive(Debug, Clone)]
pub struct GridHistogram {
    counts : Array1<u64>,
    params : HistogramParams,
}

impl GridHistogram {
    pub fn new(params : &HistogramParams) -> Self {
        GridHistogram {
            counts : Array1::zeros(params.n_bins()),
            params : params.clone(),
        }
    }

    /// Histograms every value in one export file. The file is
    /// read as a bare whitespace-separated value stream; no
    /// grid shape is required.
    pub fn from_file(path : &Path, params : &HistogramParams) -> Result<Self, DatasetError> {
        let mut histogram = GridHistogram::new(params);
        for value in grid::load_values(path)? {
            histogram.accumulate(value);
        }
        Ok(histogram)
    }

    /// Adds one value to the histogram.
    pub fn accumulate(&mut self, value : f64) {
        let value = if self.params.log10 {
            if value <= 0.0 {
                return;
            }
            value.log10()
        } else {
            value
        };

        let (lo, hi) = self.params.bounds();
        if !(lo..=hi).contains(&value) {
            return;
        }
        let n_bins = self.counts.len();
        let bin = (((value - lo) / (hi - lo)) * n_bins as f64) as usize;
        self.counts[bin.min(n_bins - 1)] += 1;
    }

    /// Sums another partial histogram into this one. Partials
    /// of one sweep share binning by construction.
    pub fn merge(mut self, other : &GridHistogram) -> Self {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        self.counts += &other.counts;
        self
    }

    pub fn counts(&self) -> &Array1<u64> {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Bin edges, length `n_bins + 1`.
    pub fn edges(&self) -> Array1<f64> {
        let (lo, hi) = self.params.bounds();
        let n_bins = self.counts.len();
        Array1::from_iter(
            (0..=n_bins).map(|i| lo + (hi - lo) * i as f64 / n_bins as f64)
        )
    }

    /// Bin centers, length `n_bins`.
    pub fn centers(&self) -> Array1<f64> {
        let edges = self.edges();
        Array1::from_iter(
            (0..self.counts.len()).map(|i| (edges[i] + edges[i + 1]) / 2.0)
        )
    }

    /// Mean, spread and percentiles of the binned distribution.
    pub fn stats(&self) -> HistogramStats {
        let centers = self.centers();
        let total = self.total() as f64;

        let mean = izip!(centers.iter(), self.counts.iter())
            .map(|(&center, &count)| center * count as f64)
            .sum::<f64>() / total;
        let variance = izip!(centers.iter(), self.counts.iter())
            .map(|(&center, &count)| (center - mean).powi(2) * count as f64)
            .sum::<f64>() / total;

        let mut cdf = Vec::with_capacity(self.counts.len());
        let mut running = 0u64;
        for &count in self.counts.iter() {
            running += count;
            cdf.push(running as f64 / total);
        }

        let percentiles = [0.01, 0.05, 0.95, 0.99]
            .iter()
            .map(|&p| (p, interp(p, &cdf, &centers)))
            .collect();

        HistogramStats {
            mean,
            stddev : variance.sqrt(),
            percentiles,
        }
    }

    /// Writes the counts, bin edges and bin width as text
    /// companions `{stem}.hist`, `{stem}.bins` and
    /// `{stem}.width`, one value per line.
    pub fn save(&self, stem : &Path, dry_run : bool) -> Result<(), DatasetError> {
        let write = |extension : &str, lines : Vec<String>| -> Result<(), DatasetError> {
            let mut name = stem.as_os_str().to_os_string();
            name.push(extension);
            let path = PathBuf::from(name);
            if dry_run {
                log::info!("Would save {} lines to {}", lines.len(), path.display());
                return Ok(());
            }
            log::info!("Saving {} lines to {}", lines.len(), path.display());
            std::fs::write(&path, lines.join("\n") + "\n")?;
            Ok(())
        };

        write(".hist", self.counts.iter().map(|count| count.to_string()).collect())?;
        write(".bins", self.edges().iter()
            .map(|&edge| grid::format_sig(edge, grid::EXPORT_SIG_DIGITS))
            .collect())?;
        write(".width", vec![grid::format_sig(self.params.binwidth, grid::EXPORT_SIG_DIGITS)])?;
        Ok(())
    }
}

/// Summary statistics computed from an accumulated histogram.
#[derive(Debug, Clone)]
pub struct HistogramStats {
    pub mean : f64,
    pub stddev : f64,
    /// (fraction, value) pairs for the 1st, 5th, 95th and 99th
    /// percentiles, interpolated from the CDF over bin centers.
    pub percentiles : Vec<(f64, f64)>,
}

/// Linear interpolation of `p` against a monotone `cdf`,
/// returning the matching bin-center value. Clamps to the end
/// centers outside the covered range.
fn interp(p : f64, cdf : &[f64], centers : &Array1<f64>) -> f64 {
    if cdf.is_empty() {
        return f64::NAN;
    }
    if p <= cdf[0] {
        return centers[0];
    }
    for i in 1..cdf.len() {
        if p <= cdf[i] {
            let span = cdf[i] - cdf[i - 1];
            let t = if span > 0.0 { (p - cdf[i - 1]) / span } else { 1.0 };
            return centers[i - 1] + t * (centers[i] - centers[i - 1]);
        }
    }
    centers[centers.len() - 1]
}

/// Accumulates one histogram over every matching file under
/// `dir`, one file per worker. Per-file failures are logged and
/// skipped; the remaining partial histograms are summed. No
/// matching file at all, or nothing readable, is an error.
pub fn accumulate_directory(
    dir : &Path,
    suffixes : &[String],
    recursive : bool,
    params : &HistogramParams,
    ) -> Result<GridHistogram, DatasetError> {
    let files : Vec<PathBuf> = if recursive {
        walk::files_recursively(dir, suffixes).collect()
    } else {
        walk::files_non_recursively(dir, suffixes)?.collect()
    };

    if files.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }
    log::info!("Accumulating histograms over {} files", files.len());

    files.par_iter()
        .filter_map(|path| match GridHistogram::from_file(path, params) {
            Ok(histogram) => Some(histogram),
            Err(err) => {
                log::warn!("Error processing {}: {}", path.display(), err);
                None
            }
        })
        .reduce_with(|accumulated, partial| accumulated.merge(&partial))
        .ok_or(DatasetError::EmptyDataset)
}
