use cgmath::vec2;
use ndarray::{Array, Array1, Array2};

use crate::field::FieldModel;

/// Field values on a rectilinear grid.
///
/// `values` has shape `(xs.len(), ys.len())` and is indexed `[[ix, iy]]`:
/// the first index walks along x, the second along y. Both axes are
/// strictly increasing.
#[derive(Clone, Debug, PartialEq)]
pub struct IntensityMatrix {
    pub xs: Array1<f64>,
    pub ys: Array1<f64>,
    pub values: Array2<f64>,
}

impl IntensityMatrix {
    pub fn new(xs: Array1<f64>, ys: Array1<f64>, values: Array2<f64>) -> Self {
        assert_eq!(values.dim(), (xs.len(), ys.len()));
        Self { xs, ys, values }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Smallest and largest finite value, `None` if there is none.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Sample `model` at `(i / size, j / size)` for `i, j` in `0..size`.
pub fn sample(model: &dyn FieldModel, size: usize, step: u64) -> IntensityMatrix {
    let n = size as f64;
    let axis = Array::from_shape_fn(size, |i| i as f64 / n);

    let values = Array::from_shape_fn((size, size), |(i, j)| {
        model.sample(vec2(axis[i], axis[j]), step)
    });

    IntensityMatrix::new(axis.clone(), axis, values)
}
