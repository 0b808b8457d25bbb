//! Whitespace-delimited `x y value` sample files.
//!
//! One sample per line, no header. Column 0 is x, column 1 is y. The
//! distinct x and y values form the grid axes and every `(x, y)` pair
//! must appear exactly once, in any order.

use std::io::ErrorKind;
use std::path::Path;

use ndarray::{Array, Array1};

use crate::error::{Error, Result};
use crate::grid::IntensityMatrix;

/// Read and parse a data file.
///
/// A missing file is [`Error::MissingInput`], contents that are not a
/// complete grid of numeric triples are [`Error::MalformedData`].
pub fn read_triples(path: &Path) -> Result<IntensityMatrix> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::MissingInput(path.to_path_buf()))
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(Error::malformed(path, "not valid UTF-8 text"))
        }
        Err(e) => return Err(e.into()),
    };

    parse_triples(&text).map_err(|reason| Error::malformed(path, reason))
}

pub fn parse_triples(text: &str) -> std::result::Result<IntensityMatrix, String> {
    let mut samples = Vec::new();

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = line
            .split_whitespace()
            .map(|f| f.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| format!("line {}: {}", n + 1, e))?;

        match fields[..] {
            [x, y, v] if x.is_finite() && y.is_finite() => samples.push((x, y, v)),
            [_, _, _] => return Err(format!("line {}: non-finite coordinate", n + 1)),
            _ => {
                return Err(format!(
                    "line {}: expected 3 fields, found {}",
                    n + 1,
                    fields.len()
                ))
            }
        }
    }

    if samples.is_empty() {
        return Err("no samples".to_string());
    }

    let xs = axis(samples.iter().map(|s| s.0));
    let ys = axis(samples.iter().map(|s| s.1));

    if samples.len() != xs.len() * ys.len() {
        return Err(format!(
            "{} samples do not fill a {}x{} grid",
            samples.len(),
            xs.len(),
            ys.len()
        ));
    }

    let mut values = Array::from_elem((xs.len(), ys.len()), f64::NAN);
    let mut seen = Array::from_elem((xs.len(), ys.len()), false);

    for &(x, y, v) in &samples {
        let i = position(&xs, x)?;
        let j = position(&ys, y)?;
        if seen[[i, j]] {
            return Err(format!("duplicate sample at ({}, {})", x, y));
        }
        seen[[i, j]] = true;
        values[[i, j]] = v;
    }

    Ok(IntensityMatrix::new(xs, ys, values))
}

fn axis(coords: impl Iterator<Item = f64>) -> Array1<f64> {
    let mut v: Vec<f64> = coords.collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v.dedup();
    Array::from(v)
}

fn position(axis: &Array1<f64>, c: f64) -> std::result::Result<usize, String> {
    axis.iter()
        .position(|&a| a == c)
        .ok_or_else(|| format!("coordinate {} is not on the grid", c))
}
