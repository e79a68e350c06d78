//! Resolving and loading one related set of grid exports. A
//! single acquisition position produces many co-located
//! per-pixel quantity files sharing a single stem; family
//! membership is encoded purely in the file names as
//! `<stem>_<suffix>.asc`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::data::dimensions::{Dimensions, DimensionsError};
use crate::data::grid;
use crate::data::mask::MaskedGrid;
use crate::file_kinds::{QuantityKind, SuffixTable};
use crate::utils::DatasetError;

/// A related dataset of masked grids, produced by applying one
/// combined mask across every member.
pub type MaskedDataset = BTreeMap<QuantityKind, MaskedGrid>;

/// Extensions that mark a path as naming a whole image set
/// rather than one quantity export.
const IMAGE_SET_EXTENSIONS : [&str; 1] = ["img"];

/// Derives the stem shared by one family of related exports
/// from the path of any member: the name with its extension and
/// its recognized quantity suffix removed.
///
/// If no suffix in `table` matches, a path with an image-set
/// extension is returned unchanged (minus extension); anything
/// else gets a warning and the best-effort unmodified name, so
/// a misnamed file degrades to a one-member family instead of
/// aborting the run.
///
/// ## Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use ascflim::{stem_of, SuffixTable};
///
/// let table = SuffixTable::default();
/// assert_eq!(stem_of(Path::new("pos_0000_a1.asc"), &table), PathBuf::from("pos_0000"));
/// assert_eq!(stem_of(Path::new("pos_0000_a1[%].asc"), &table), PathBuf::from("pos_0000"));
/// ```
pub fn stem_of(path : &Path, table : &SuffixTable) -> PathBuf {
    let name = path.with_extension("");
    let file_name = match name.file_name() {
        Some(file_name) => file_name.to_string_lossy().into_owned(),
        None => return name,
    };

    for kind in table.iter() {
        let ending = format!("_{}", kind.suffix());
        if let Some(stripped) = file_name.strip_suffix(ending.as_str()) {
            return name.with_file_name(stripped);
        }
    }

    match path.extension().map(|ext| ext.to_string_lossy()) {
        Some(ext) if IMAGE_SET_EXTENSIONS.contains(&ext.as_ref()) => name,
        _ => {
            log::warn!("No related suffix found for {}; assuming the name is already a stem",
                path.display());
            name
        }
    }
}

/// The on-disk path of one member of the family rooted at
/// `stem`.
pub fn member_path(stem : &Path, kind : QuantityKind) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(format!("_{}.asc", kind.suffix()));
    PathBuf::from(name)
}

/// Tests, for every kind in `table`, whether
/// `{stem}_{suffix}.asc` exists on disk, and returns the kinds
/// found in table order. Kinds whose file is absent are simply
/// skipped; datasets legitimately vary in which quantities were
/// exported.
///
/// `statistic_all` is always excluded even when its file is
/// present, because its grid shape is incompatible with the
/// rest of the set.
pub fn discover(stem : &Path, table : &SuffixTable) -> Vec<QuantityKind> {
    let mut found = Vec::new();
    for &kind in table.iter() {
        if kind == QuantityKind::StatisticAll {
            continue;
        }
        if member_path(stem, kind).is_file() {
            found.push(kind);
        }
    }
    found
}

/// A mapping from quantity kind to its grid, populated lazily
/// by file existence. All members share one shape; the first
/// inserted grid fixes it.
#[derive(Debug, Clone, Default)]
pub struct RelatedDataset {
    grids : BTreeMap<QuantityKind, Array2<f64>>,
}

impl RelatedDataset {
    pub fn new() -> Self {
        RelatedDataset::default()
    }

    /// Loads every related `.asc` file that exists for the
    /// family `path` belongs to.
    ///
    /// ## Arguments
    ///
    /// * `path` - any one member of the family
    ///
    /// * `table` - the recognized-suffix table
    ///
    /// ## Example
    ///
    /// ```rust, ignore
    /// let dataset = RelatedDataset::load_related(
    ///     Path::new("pos_0000_a1.asc"),
    ///     &SuffixTable::default(),
    /// )?;
    /// ```
    pub fn load_related(path : &Path, table : &SuffixTable) -> Result<Self, DatasetError> {
        let stem = stem_of(path, table);
        let mut dataset = RelatedDataset::new();
        for kind in discover(&stem, table) {
            let member = member_path(&stem, kind);
            let dims = dataset.dimensions();
            let grid = grid::load_asc(&member, dims.as_ref())?;
            dataset.insert(kind, grid)?;
        }
        Ok(dataset)
    }

    /// Adds one grid, enforcing the shared shape. The first
    /// grid fixes the shape of the whole set.
    pub fn insert(&mut self, kind : QuantityKind, grid : Array2<f64>) -> Result<(), DimensionsError> {
        if let Some(required) = self.dimensions() {
            let found = Dimensions::of(&grid);
            if found != required {
                return Err(DimensionsError::MismatchedDimensions { required, found });
            }
        }
        self.grids.insert(kind, grid);
        Ok(())
    }

    pub fn get(&self, kind : QuantityKind) -> Option<&Array2<f64>> {
        self.grids.get(&kind)
    }

    pub fn contains(&self, kind : QuantityKind) -> bool {
        self.grids.contains_key(&kind)
    }

    /// The kinds present, in enum order.
    pub fn kinds(&self) -> Vec<QuantityKind> {
        self.grids.keys().copied().collect()
    }

    /// The shared shape of the set, if any member has been
    /// inserted.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.grids.values().next().map(Dimensions::of)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuantityKind, &Array2<f64>)> {
        self.grids.iter()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}
