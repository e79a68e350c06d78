//! The closed vocabulary of per-pixel quantities a fit export
//! can produce, and the ordered suffix table used to recognize
//! them in file names.

/// One per-pixel quantity of a FLIM fit export.
///
/// On disk a quantity is identified purely by the file-name
/// suffix appended to the shared stem (`pos_0000_a1.asc` is the
/// `A1` grid of the `pos_0000` family). The two computed kinds,
/// [`QuantityKind::BinnedPhotons`] and
/// [`QuantityKind::FreeBoundRatio`], are derived after load
/// rather than read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuantityKind {
    /// Free-component amplitude
    A1,
    /// Bound-component amplitude
    A2,
    /// Free-component lifetime
    T1,
    /// Bound-component lifetime
    T2,
    /// Free-component amplitude, relative
    A1Percent,
    /// Bound-component amplitude, relative
    A2Percent,
    /// Chi-square of the decay fit
    Chi,
    PhasorG,
    PhasorS,
    Scatter,
    ColorCodedValue,
    /// Raw photon count per pixel
    Photons,
    Offset,
    Shift,
    ColorImage,
    /// Whole-image statistics block. Its grid shape is
    /// incompatible with the rest of a set, so it is never
    /// imported.
    StatisticAll,
    /// Photon counts re-summed over a square window (computed)
    BinnedPhotons,
    /// Free/bound amplitude ratio a1/a2 (computed)
    FreeBoundRatio,
}

impl QuantityKind {
    /// The file-name suffix identifying this quantity on disk.
    pub fn suffix(&self) -> &'static str {
        match self {
            QuantityKind::A1 => "a1",
            QuantityKind::A2 => "a2",
            QuantityKind::T1 => "t1",
            QuantityKind::T2 => "t2",
            QuantityKind::A1Percent => "a1[%]",
            QuantityKind::A2Percent => "a2[%]",
            QuantityKind::Chi => "chi",
            QuantityKind::PhasorG => "phasor_G",
            QuantityKind::PhasorS => "phasor_S",
            QuantityKind::Scatter => "scatter",
            QuantityKind::ColorCodedValue => "color coded value",
            QuantityKind::Photons => "photons",
            QuantityKind::Offset => "offset",
            QuantityKind::Shift => "shift",
            QuantityKind::ColorImage => "color_image",
            QuantityKind::StatisticAll => "statistic_all",
            QuantityKind::BinnedPhotons => "binned_photons",
            QuantityKind::FreeBoundRatio => "ar",
        }
    }

    /// True for kinds computed after load rather than exported
    /// by the fit software.
    pub fn is_derived(&self) -> bool {
        matches!(self, QuantityKind::BinnedPhotons | QuantityKind::FreeBoundRatio)
    }
}

/// The ordered list of quantity suffixes recognized on disk.
///
/// Order matters: the most specific suffix must be checked
/// first so that e.g. `a1[%]` is never conflated with `a1`.
/// The default table covers every kind the fit software
/// exports; test suites can substitute a smaller one.
#[derive(Debug, Clone)]
pub struct SuffixTable {
    kinds : Vec<QuantityKind>,
}

impl Default for SuffixTable {
    fn default() -> Self {
        SuffixTable {
            kinds : vec![
                QuantityKind::ColorCodedValue,
                QuantityKind::ColorImage,
                QuantityKind::PhasorG,
                QuantityKind::PhasorS,
                QuantityKind::Scatter,
                QuantityKind::Photons,
                QuantityKind::Offset,
                QuantityKind::A1Percent,
                QuantityKind::A2Percent,
                QuantityKind::Shift,
                QuantityKind::Chi,
                QuantityKind::A1,
                QuantityKind::A2,
                QuantityKind::T1,
                QuantityKind::T2,
            ],
        }
    }
}

impl SuffixTable {
    /// A table with caller-supplied kinds and matching order.
    pub fn new(kinds : Vec<QuantityKind>) -> Self {
        SuffixTable { kinds }
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuantityKind> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specific_suffixes_come_first() {
        let table = SuffixTable::default();
        let position = |kind : QuantityKind| {
            table.iter().position(|&k| k == kind).unwrap()
        };
        assert!(position(QuantityKind::A1Percent) < position(QuantityKind::A1));
        assert!(position(QuantityKind::A2Percent) < position(QuantityKind::A2));
    }

    #[test]
    fn default_table_has_no_derived_or_statistics_kinds() {
        let table = SuffixTable::default();
        assert!(table.iter().all(|kind| !kind.is_derived()));
        assert!(table.iter().all(|&kind| kind != QuantityKind::StatisticAll));
    }
}
