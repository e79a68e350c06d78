//! A grid paired with its invalidity mask. Masks only ever
//! widen: once a pixel has been marked invalid, no later
//! combination step un-marks it.

use itertools::izip;
use ndarray::Array2;

use crate::data::dimensions::{Dimensions, DimensionsError};

/// A grid whose pixels carry a validity flag. The "valid"
/// values are exactly the array values where the mask is false.
#[derive(Debug, Clone)]
pub struct MaskedGrid {
    data : Array2<f64>,
    mask : Array2<bool>,
}

impl MaskedGrid {
    /// Wraps a grid with an all-valid mask.
    pub fn new(data : Array2<f64>) -> Self {
        let mask = Array2::from_elem(data.dim(), false);
        MaskedGrid { data, mask }
    }

    /// Wraps a grid with the given invalidity mask; the two
    /// must agree in shape.
    pub fn with_mask(data : Array2<f64>, mask : Array2<bool>) -> Result<Self, DimensionsError> {
        if data.dim() != mask.dim() {
            let (ydim, xdim) = mask.dim();
            return Err(DimensionsError::MismatchedDimensions {
                required : Dimensions::of(&data),
                found : Dimensions::new(xdim, ydim),
            });
        }
        Ok(MaskedGrid { data, mask })
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.data)
    }

    /// ORs additional invalid positions into the mask.
    pub fn widen(&mut self, additional : &Array2<bool>) {
        izip!(self.mask.iter_mut(), additional.iter())
            .for_each(|(mask, &extra)| *mask |= extra);
    }

    /// Number of invalid pixels.
    pub fn n_masked(&self) -> usize {
        self.mask.iter().filter(|&&masked| masked).count()
    }

    /// A copy of the data with invalid positions replaced by
    /// `fill`.
    pub fn filled(&self, fill : f64) -> Array2<f64> {
        let mut out = self.data.clone();
        izip!(out.iter_mut(), self.mask.iter())
            .for_each(|(value, &masked)| if masked { *value = fill });
        out
    }
}

/// Elementwise free/bound amplitude ratio of two masked grids.
///
/// A result pixel is invalid where either input was already
/// invalid, or where either input's raw value is not positive:
/// a ratio of non-positive amplitudes is physically meaningless
/// for this quantity, so those pixels are masked instead of
/// carried through as negative or infinite values. Valid result
/// values equal `numerator / denominator` exactly, no clamping.
///
/// ## Arguments
///
/// * `numerator` - free-component amplitudes (a1)
///
/// * `denominator` - bound-component amplitudes (a2)
///
/// * `source` - an identifier (usually the input path) under
/// which the count of newly invalidated pixels is logged
pub fn free_bound_ratio(
    numerator : &MaskedGrid,
    denominator : &MaskedGrid,
    source : Option<&str>,
    ) -> Result<MaskedGrid, DimensionsError> {
    if numerator.data.dim() != denominator.data.dim() {
        return Err(DimensionsError::MismatchedDimensions {
            required : numerator.dimensions(),
            found : denominator.dimensions(),
        });
    }

    let mut data = Array2::<f64>::zeros(numerator.data.dim());
    let mut mask = Array2::from_elem(numerator.data.dim(), false);
    let mut n_invalidated = 0usize;

    izip!(
        data.iter_mut(),
        mask.iter_mut(),
        numerator.data.iter(),
        numerator.mask.iter(),
        denominator.data.iter(),
        denominator.mask.iter()
    ).for_each(|(ratio, masked, &free, &free_masked, &bound, &bound_masked)| {
        let invalid_division = free <= 0.0 || bound <= 0.0;
        if invalid_division && !(free_masked || bound_masked) {
            n_invalidated += 1;
        }
        *masked = free_masked || bound_masked || invalid_division;
        *ratio = free / bound;
    });

    if let Some(source) = source {
        if n_invalidated > 0 {
            log::info!("free_bound_ratio: {}: {} pixels masked due to invalid division",
                source, n_invalidated);
        }
    }

    Ok(MaskedGrid { data, mask })
}
