//! `data`
//!
//! Grid-level structures: the text codec, dimension
//! bookkeeping, masked grids, the threshold engine and
//! histogram accumulation.

pub mod dimensions;
pub mod grid;
pub mod histogram;
pub mod mask;
pub mod threshold;
