//! The threshold engine: combines per-quantity range criteria
//! into one validity mask over a whole pixel grid, then applies
//! that mask uniformly across every co-located quantity.

use std::collections::BTreeMap;

use itertools::izip;
use ndarray::{s, Array2};

use crate::data::mask::MaskedGrid;
use crate::dataset::{MaskedDataset, RelatedDataset};
use crate::file_kinds::QuantityKind;
use crate::utils::DatasetError;

/// Inclusive per-quantity value ranges. Kinds listed here but
/// absent from a dataset are skipped when the spec is applied;
/// different experiments export different quantity sets.
#[derive(Debug, Clone, Default)]
pub struct ThresholdSpec {
    ranges : BTreeMap<QuantityKind, (f64, f64)>,
}

impl ThresholdSpec {
    pub fn new() -> Self {
        ThresholdSpec::default()
    }

    /// Sets the inclusive `[min, max]` range for one quantity.
    pub fn set(mut self, kind : QuantityKind, min : f64, max : f64) -> Self {
        self.ranges.insert(kind, (min, max));
        self
    }

    pub fn get(&self, kind : QuantityKind) -> Option<(f64, f64)> {
        self.ranges.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuantityKind, &(f64, f64))> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Acquisition settings that determine what a "sane" fit looks
/// like for one experiment.
#[derive(Debug, Clone)]
pub struct AcquisitionParams {
    /// Laser repetition frequency, MHz
    pub rep_rate_mhz : f64,
    /// Pixel dwell time, microseconds
    pub pixel_dwell_us : f64,
    /// Number of frames accumulated in the acquisition
    pub frames_accumulated : f64,
    /// Minimum photons in a re-binned window for a confident fit
    pub min_binned_photons : f64,
    /// Acceptable chi-square range for the decay fit
    pub chisq_range : (f64, f64),
}

impl Default for AcquisitionParams {
    fn default() -> Self {
        AcquisitionParams {
            rep_rate_mhz : 80.0,
            pixel_dwell_us : 5.0,
            frames_accumulated : 45.0,
            min_binned_photons : 3000.0,
            chisq_range : (0.5, 2.0),
        }
    }
}

impl AcquisitionParams {
    /// Maximum photons per pixel before TCSPC pile-up distorts
    /// the decay: 30% saturation at the laser repetition rate
    /// over the full dwell of the accumulated acquisition.
    pub fn max_photons(&self) -> f64 {
        0.3 * self.rep_rate_mhz * self.pixel_dwell_us * self.frames_accumulated
    }

    /// The canonical threshold set limiting exports to pixels
    /// which have sane fits.
    pub fn reasonable_thresholds(&self) -> ThresholdSpec {
        ThresholdSpec::new()
            .set(QuantityKind::A1, 0.0, f64::INFINITY)
            .set(QuantityKind::A2, 0.0, f64::INFINITY)
            .set(QuantityKind::T1, 0.0, f64::INFINITY)
            .set(QuantityKind::T2, 0.0, f64::INFINITY)
            .set(QuantityKind::Photons, 0.0, self.max_photons())
            .set(QuantityKind::Chi, self.chisq_range.0, self.chisq_range.1)
            .set(QuantityKind::BinnedPhotons, self.min_binned_photons, f64::INFINITY)
    }
}

/// Builds the combined invalidity mask for a dataset: a pixel
/// fails when any quantity present in both the dataset and the
/// spec falls outside its inclusive range.
///
/// Mask combination is OR, so the iteration order over spec
/// entries never affects the result, and adding a criterion
/// never un-marks a pixel. An empty dataset is an error; there
/// is no shape to build the mask from.
pub fn combined_mask(dataset : &RelatedDataset, spec : &ThresholdSpec) -> Result<Array2<bool>, DatasetError> {
    let dims = dataset.dimensions().ok_or(DatasetError::EmptyDataset)?;
    let mut mask = Array2::from_elem(dims.to_tuple(), false);

    for (&kind, &(min, max)) in spec.iter() {
        let grid = match dataset.get(kind) {
            Some(grid) => grid,
            None => continue,
        };
        let mut n_failed = 0usize;
        izip!(mask.iter_mut(), grid.iter()).for_each(|(masked, &value)| {
            let failed = value < min || value > max;
            if failed {
                n_failed += 1;
            }
            *masked |= failed;
        });
        log::debug!("{}: thresh=[{}, {}], failed={}/{}",
            kind.suffix(), min, max, n_failed, dims.n_pixels());
    }

    Ok(mask)
}

/// Wraps every grid of the dataset with the same combined mask:
/// one bad-fit pixel invalidates all of its co-located
/// quantities, whether or not that quantity contributed a
/// criterion.
pub fn apply_mask(dataset : &RelatedDataset, mask : &Array2<bool>) -> MaskedDataset {
    dataset.iter().map(|(&kind, grid)| {
        let mut masked = MaskedGrid::new(grid.clone());
        masked.widen(mask);
        (kind, masked)
    }).collect()
}

/// Sums photon counts over a square window of side
/// `2 * half_window + 1` centered on each pixel, zero-padded at
/// the image boundary. Pixels near an edge get a partial-window
/// sum rather than being rejected, so edge pixels stay eligible
/// for thresholding on their (smaller) local count.
pub fn binned_photon_count(photons : &Array2<f64>, half_window : usize) -> Array2<f64> {
    let (height, width) = photons.dim();
    let mut binned = Array2::zeros((height, width));
    let half = half_window as isize;

    for ((y, x), sum) in binned.indexed_iter_mut() {
        let y0 = (y as isize - half).max(0) as usize;
        let y1 = ((y as isize + half) as usize).min(height - 1);
        let x0 = (x as isize - half).max(0) as usize;
        let x1 = ((x as isize + half) as usize).min(width - 1);
        *sum = photons.slice(s![y0..=y1, x0..=x1]).sum();
    }

    binned
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn two_member_dataset() -> RelatedDataset {
        let mut dataset = RelatedDataset::new();
        dataset.insert(QuantityKind::A1, array![[1.0, -2.0], [3.0, 4.0]]).unwrap();
        dataset.insert(QuantityKind::Chi, array![[0.9, 1.1], [5.0, 1.0]]).unwrap();
        dataset
    }

    #[test]
    fn combined_mask_ors_criteria_together() {
        let dataset = two_member_dataset();
        let spec = ThresholdSpec::new()
            .set(QuantityKind::A1, 0.0, f64::INFINITY)
            .set(QuantityKind::Chi, 0.5, 2.0);

        let mask = combined_mask(&dataset, &spec).unwrap();
        assert_eq!(mask, array![[false, true], [true, false]]);
    }

    #[test]
    fn spec_kinds_absent_from_dataset_are_skipped() {
        let dataset = two_member_dataset();
        let spec = ThresholdSpec::new()
            .set(QuantityKind::Photons, 0.0, 10.0);

        let mask = combined_mask(&dataset, &spec).unwrap();
        assert!(mask.iter().all(|&masked| !masked));
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let dataset = RelatedDataset::new();
        let spec = ThresholdSpec::new().set(QuantityKind::A1, 0.0, 1.0);
        assert!(matches!(combined_mask(&dataset, &spec),
            Err(DatasetError::EmptyDataset)));
    }

    #[test]
    fn adding_a_criterion_is_monotone() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut dataset = RelatedDataset::new();
        dataset.insert(QuantityKind::A1,
            Array2::from_shape_fn((32, 32), |_| rng.gen_range(-1.0..2.0))).unwrap();
        dataset.insert(QuantityKind::Chi,
            Array2::from_shape_fn((32, 32), |_| rng.gen_range(0.0..3.0))).unwrap();

        let loose = ThresholdSpec::new().set(QuantityKind::A1, 0.0, f64::INFINITY);
        let strict = ThresholdSpec::new()
            .set(QuantityKind::A1, 0.0, f64::INFINITY)
            .set(QuantityKind::Chi, 0.5, 2.0);

        let n_loose = combined_mask(&dataset, &loose).unwrap()
            .iter().filter(|&&m| m).count();
        let n_strict = combined_mask(&dataset, &strict).unwrap()
            .iter().filter(|&&m| m).count();
        assert!(n_strict >= n_loose);
    }

    #[test]
    fn criterion_order_does_not_matter() {
        let dataset = two_member_dataset();
        let forward = ThresholdSpec::new()
            .set(QuantityKind::A1, 0.0, f64::INFINITY)
            .set(QuantityKind::Chi, 0.5, 2.0);
        let backward = ThresholdSpec::new()
            .set(QuantityKind::Chi, 0.5, 2.0)
            .set(QuantityKind::A1, 0.0, f64::INFINITY);

        assert_eq!(combined_mask(&dataset, &forward).unwrap(),
            combined_mask(&dataset, &backward).unwrap());
    }

    #[test]
    fn mask_applies_to_every_quantity() {
        let dataset = two_member_dataset();
        let spec = ThresholdSpec::new().set(QuantityKind::Chi, 0.5, 2.0);

        let masked = apply_mask(&dataset, &combined_mask(&dataset, &spec).unwrap());
        // chi fails at (1, 0); a1 is masked there too even
        // though a1 contributed no criterion
        assert_eq!(masked[&QuantityKind::A1].mask(),
            &array![[false, false], [true, false]]);
        assert_eq!(masked[&QuantityKind::Chi].mask(),
            &array![[false, false], [true, false]]);
    }

    #[test]
    fn binned_photons_zero_pads_the_boundary() {
        let photons = Array2::from_elem((3, 3), 1.0);
        let binned = binned_photon_count(&photons, 1);
        assert_eq!(binned[[1, 1]], 9.0);
        assert_eq!(binned[[0, 0]], 4.0);
        assert_eq!(binned[[0, 1]], 6.0);
        assert_eq!(binned[[2, 2]], 4.0);
    }

    #[test]
    fn binned_photons_with_zero_window_is_identity() {
        let photons = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(binned_photon_count(&photons, 0), photons);
    }

    #[test]
    fn default_params_match_the_acquisition() {
        let params = AcquisitionParams::default();
        assert_eq!(params.max_photons(), 0.3 * 80.0 * 5.0 * 45.0);
        let spec = params.reasonable_thresholds();
        assert_eq!(spec.get(QuantityKind::Chi), Some((0.5, 2.0)));
        assert_eq!(spec.get(QuantityKind::BinnedPhotons),
            Some((3000.0, f64::INFINITY)));
    }
}
