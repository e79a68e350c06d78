//! Code in this submodule deals strictly with attention to
//! grid dimensions and the types of things that can go wrong
//! with `Dimensions`.
//!

use ndarray::Array2;

/// `Dimensions` is a simple struct that holds the dimensions
/// of one exported grid
///
/// `xdim` is the width of the grid (values per scan line)
/// `ydim` is the height of the grid (scan lines)
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Dimensions {
    pub xdim : usize,
    pub ydim : usize,
}

#[derive(Debug, Clone)]
pub enum DimensionsError {
    MismatchedDimensions{required : Dimensions, found : Dimensions},
    NoConsistentDimensions,
}

impl Dimensions {
    pub fn new(xdim : usize, ydim : usize) -> Dimensions {
        Dimensions {
            xdim,
            ydim,
        }
    }

    /// The dimensions of an existing grid
    pub fn of(array : &Array2<f64>) -> Dimensions {
        let (ydim, xdim) = array.dim();
        Dimensions { xdim, ydim }
    }

    /// Returns the dimensions as an `ndarray` shape tuple (y, x)
    pub fn to_tuple(&self) -> (usize, usize) {
        (self.ydim, self.xdim)
    }

    /// Number of pixels in one grid of these dimensions
    pub fn n_pixels(&self) -> usize {
        self.xdim * self.ydim
    }
}

impl std::error::Error for DimensionsError {}

impl std::fmt::Display for DimensionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DimensionsError::MismatchedDimensions{required, found} => {
                write!(f, "Mismatched dimensions. Found: ({}, {}), Required: ({}, {})",
                    found.xdim, found.ydim, required.xdim, required.ydim)
            },
            DimensionsError::NoConsistentDimensions => {
                write!(f, "Data did not have consistent dimensions.")
            }
        }
    }
}
