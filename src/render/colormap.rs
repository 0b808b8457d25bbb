use serde::{Deserialize, Serialize};

/// Viridis sampled at nine evenly spaced stops.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    Viridis,
    Grayscale,
}

impl Colormap {
    /// Color for a normalized value. Out-of-range values clamp, NaN maps to the low end.
    pub fn map(self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            Colormap::Viridis => lerp_stops(&VIRIDIS, t),
            Colormap::Grayscale => {
                let l = (t * 256.0).max(0.0).min(255.0) as u8;
                [l, l, l]
            }
        }
    }
}

fn lerp_stops(stops: &[[u8; 3]], t: f64) -> [u8; 3] {
    let pos = t * (stops.len() - 1) as f64;
    let i = (pos as usize).min(stops.len() - 2);
    let s = pos - i as f64;

    let mut out = [0u8; 3];
    for (c, o) in out.iter_mut().enumerate() {
        let a = stops[i][c] as f64;
        let b = stops[i + 1][c] as f64;
        *o = (a + (b - a) * s).round() as u8;
    }
    out
}
