//! Reading and writing the whitespace-delimited `.asc` grid
//! format produced by FLIM fitting-software exports: one scan
//! line per text line, values separated by spaces.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use ndarray::Array2;

use crate::data::dimensions::{Dimensions, DimensionsError};
use crate::utils::DatasetError;

/// Significant digits used on export. Enough to round-trip
/// lifetime and ratio values through the text format.
pub const EXPORT_SIG_DIGITS : usize = 7;

fn parse_token(path : &Path, token : &str) -> Result<f64, DatasetError> {
    token.parse::<f64>().map_err(|_| {
        DatasetError::FormatError(
            format!("{}: non-numeric token {:?}", path.display(), token)
        )
    })
}

/// Parses every whitespace-separated value in `path`, with no
/// shape requirement. Used where only the values matter, e.g.
/// histogram sweeps over exports of mixed provenance.
pub fn load_values(path : &Path) -> Result<Vec<f64>, DatasetError> {
    let file = File::open(path)?;
    let mut values = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        for token in line.split_whitespace() {
            values.push(parse_token(path, token)?);
        }
    }
    Ok(values)
}

/// Loads one grid from the text file at `path`.
///
/// The file may be a matrix (every line the same number of
/// values) or, when `expected` is given, a flat sequence of
/// exactly `xdim * ydim` values that is reshaped. Anything else
/// is a format error naming the path.
///
/// ## Arguments
///
/// * `path` - The file to read
///
/// * `expected` - The shape the rest of the related set has, if
/// any member has been loaded already
///
/// ## Example
///
/// ```rust, ignore
/// let grid = load_asc(Path::new("pos_0000_a1.asc"), None)?;
/// let chi = load_asc(
///     Path::new("pos_0000_chi.asc"),
///     Some(&Dimensions::of(&grid)),
/// )?;
/// ```
pub fn load_asc(path : &Path, expected : Option<&Dimensions>) -> Result<Array2<f64>, DatasetError> {
    let file = File::open(path)?;

    let mut rows : Vec<Vec<f64>> = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let row = line
            .split_whitespace()
            .map(|token| parse_token(path, token))
            .collect::<Result<Vec<f64>, DatasetError>>()?;
        if !row.is_empty() {
            rows.push(row);
        }
    }

    let matrix_form = !rows.is_empty()
        && rows.iter().all(|row| row.len() == rows[0].len());

    let (ydim, xdim) = match expected {
        None => {
            if !matrix_form {
                return Err(DimensionsError::NoConsistentDimensions.into());
            }
            (rows.len(), rows[0].len())
        },
        Some(dims) => {
            let n_values : usize = rows.iter().map(|row| row.len()).sum();
            let matches_matrix = matrix_form
                && rows.len() == dims.ydim
                && rows[0].len() == dims.xdim;
            if !matches_matrix && n_values != dims.n_pixels() {
                return Err(DatasetError::FormatError(
                    format!("{}: {} values match neither a flat ({}) nor a ({}, {}) layout",
                        path.display(), n_values, dims.n_pixels(), dims.ydim, dims.xdim)
                ));
            }
            (dims.ydim, dims.xdim)
        }
    };

    log::debug!("Loaded ({}, {}) from {}", ydim, xdim, path.display());

    let flat : Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((ydim, xdim), flat).map_err(|err| {
        DatasetError::FormatError(format!("{}: {}", path.display(), err))
    })
}

/// Writes `grid` to `path` as whitespace-delimited rows, one
/// scan line per output line, `%.7g`-style formatting. In dry
/// mode all validation and logging happens but the write is
/// skipped.
pub fn save_asc(path : &Path, grid : &Array2<f64>, dry_run : bool) -> Result<(), DatasetError> {
    let dims = Dimensions::of(grid);
    if dry_run {
        log::info!("Would save ({}, {}) to {}", dims.ydim, dims.xdim, path.display());
        return Ok(());
    }
    log::info!("Saving ({}, {}) to {}", dims.ydim, dims.xdim, path.display());

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for row in grid.rows() {
        let line = row.iter()
            .map(|&value| format_sig(value, EXPORT_SIG_DIGITS))
            .join(" ");
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Formats `value` with `sig` significant digits in the manner
/// of printf's `%g`: positional notation for moderate
/// exponents, scientific otherwise, trailing zeros trimmed.
/// NaN serializes as the `NaN` token, which parses back to NaN.
pub fn format_sig(value : f64, sig : usize) -> String {
    if value.is_nan() {
        return String::from("NaN");
    }
    if value.is_infinite() {
        return String::from(if value > 0.0 { "inf" } else { "-inf" });
    }
    if value == 0.0 {
        return String::from("0");
    }

    let exponent = value.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= sig as i32 {
        let formatted = format!("{:.*e}", sig.saturating_sub(1), value);
        match formatted.split_once('e') {
            Some((mantissa, exp)) => {
                let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
                format!("{}e{}", mantissa, exp)
            },
            None => formatted,
        }
    } else {
        let decimals = (sig as i32 - 1 - exponent).max(0) as usize;
        let formatted = format!("{:.*}", decimals, value);
        if formatted.contains('.') {
            formatted.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            formatted
        }
    }
}
