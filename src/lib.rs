//! Tools for post-processing per-pixel FLIM fit exports:
//! loading a family of related `.asc` grids, thresholding it
//! down to the pixels with sane fits, and writing the surviving
//! values back out with invalid pixels marked as NaN.
//!
//! The main entry points are [`open_related`], which loads
//! every co-located quantity for one acquisition position, and
//! [`threshold_related`], which runs the whole
//! resolve → load → derive → threshold → export pipeline for
//! one family. Directory-scale histogram sweeps live in
//! [`data::histogram`].

use std::path::{Path, PathBuf};

pub mod data;
mod dataset;
mod export;
mod file_kinds;
mod utils;
pub mod walk;

pub use data::dimensions::{Dimensions, DimensionsError};
pub use data::grid::{format_sig, load_asc, load_values, save_asc};
pub use data::histogram::{accumulate_directory, GridHistogram, HistogramParams, HistogramStats};
pub use data::mask::{free_bound_ratio, MaskedGrid};
pub use data::threshold::{
    apply_mask, binned_photon_count, combined_mask, AcquisitionParams, ThresholdSpec,
};
pub use dataset::{discover, member_path, stem_of, MaskedDataset, RelatedDataset};
pub use export::{export_all, export_masked};
pub use file_kinds::{QuantityKind, SuffixTable};
pub use utils::DatasetError;

/// Options controlling one thresholding pass over one related
/// family.
#[derive(Debug, Clone)]
pub struct ThresholdOptions {
    /// Half-window for re-binning photon counts; the summing
    /// window is `2 * half_window + 1` pixels on a side.
    pub half_window : usize,
    /// Appended to `{stem}_{kind}` for every exported file.
    pub suffix : String,
    /// Sentinel written at invalid pixels.
    pub fill : f64,
    /// Validate and log, but skip the writes.
    pub dry_run : bool,
    pub acquisition : AcquisitionParams,
    pub suffixes : SuffixTable,
}

impl Default for ThresholdOptions {
    fn default() -> Self {
        ThresholdOptions {
            half_window : 1,
            suffix : String::from(".th.asc"),
            fill : f64::NAN,
            dry_run : false,
            acquisition : AcquisitionParams::default(),
            suffixes : SuffixTable::default(),
        }
    }
}

/// `open_related(filename)` loads every related `.asc` export
/// of the family `filename` belongs to.
///
/// ## Arguments
///
/// * `filename` - path of any one member of the family
///
/// ## Example
///
/// ```rust, ignore
/// let dataset = ascflim::open_related("pos_0000_a1.asc")?;
/// ```
pub fn open_related(filename : &str) -> Result<RelatedDataset, DatasetError> {
    RelatedDataset::load_related(Path::new(filename), &SuffixTable::default())
}

/// Runs the full thresholding pipeline for the family `input`
/// belongs to: load all related quantities, re-bin the photon
/// counts, build and apply the combined validity mask, add the
/// free/bound ratio, and export everything with invalid pixels
/// filled.
///
/// `out` may be a directory, in which case the family stem is
/// re-rooted there, or a file path whose own stem is used.
///
/// Returns the paths written (or that would be written, in dry
/// mode).
pub fn threshold_related(
    input : &Path,
    out : &Path,
    options : &ThresholdOptions,
    ) -> Result<Vec<PathBuf>, DatasetError> {
    let mut dataset = RelatedDataset::load_related(input, &options.suffixes)?;
    if dataset.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }

    let binned = dataset.get(QuantityKind::Photons)
        .map(|photons| binned_photon_count(photons, options.half_window));
    match binned {
        Some(binned) => dataset.insert(QuantityKind::BinnedPhotons, binned)?,
        None => {
            log::warn!("{}: no photons grid; skipping the re-binned photon criterion",
                input.display());
        }
    }

    let spec = options.acquisition.reasonable_thresholds();
    let mask = combined_mask(&dataset, &spec)?;
    log::debug!("{}: {} of {} pixels masked", input.display(),
        mask.iter().filter(|&&masked| masked).count(), mask.len());

    let mut masked = apply_mask(&dataset, &mask);

    let ratio = match (masked.get(&QuantityKind::A1), masked.get(&QuantityKind::A2)) {
        (Some(free), Some(bound)) => {
            let source = input.display().to_string();
            Some(free_bound_ratio(free, bound, Some(&source))?)
        },
        _ => None,
    };
    if let Some(ratio) = ratio {
        masked.insert(QuantityKind::FreeBoundRatio, ratio);
    }

    let stem = if out.is_dir() {
        let file_name = input.file_name().map(Path::new).unwrap_or(input);
        out.join(stem_of(file_name, &options.suffixes))
    } else {
        stem_of(out, &options.suffixes)
    };

    export_all(&stem, &masked, &options.suffix, options.fill, options.dry_run)
}
