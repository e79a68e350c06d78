//! Masked export: invalid pixels are written as a sentinel
//! (canonically NaN) and each quantity goes back out through
//! the grid codec under the family stem.

use std::path::{Path, PathBuf};

use crate::data::grid;
use crate::data::mask::MaskedGrid;
use crate::dataset::MaskedDataset;
use crate::utils::DatasetError;

/// Writes one masked grid to `path` with invalid positions
/// replaced by `fill`.
pub fn export_masked(
    path : &Path,
    grid : &MaskedGrid,
    fill : f64,
    dry_run : bool,
    ) -> Result<(), DatasetError> {
    grid::save_asc(path, &grid.filled(fill), dry_run)
}

/// Writes every quantity in the dataset to
/// `{stem}_{kind-suffix}{suffix}`, invalid pixels filled with
/// `fill`. In dry mode the shape and destination of each
/// quantity are logged without writing. Returns the destination
/// paths in kind order.
pub fn export_all(
    stem : &Path,
    dataset : &MaskedDataset,
    suffix : &str,
    fill : f64,
    dry_run : bool,
    ) -> Result<Vec<PathBuf>, DatasetError> {
    let mut written = Vec::with_capacity(dataset.len());
    for (kind, grid) in dataset.iter() {
        let mut name = stem.as_os_str().to_os_string();
        name.push(format!("_{}{}", kind.suffix(), suffix));
        let path = PathBuf::from(name);
        export_masked(&path, grid, fill, dry_run)?;
        written.push(path);
    }
    Ok(written)
}
