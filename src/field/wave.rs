use cgmath::Vector2;

use super::FieldModel;
use crate::config::WaveConfig;

/// Rotated ellipse anchored at the origin whose semi-axes grow linearly with the step.
///
/// Inside the ellipse the value is the normalized quadratic form itself,
/// rising from 0 at the center to 1 on the boundary. Outside it is 0.
#[derive(Clone, Debug)]
pub struct WaveModel {
    config: WaveConfig,
    cos_c: f64,
    sin_c: f64,
}

impl WaveModel {
    pub fn new(config: WaveConfig) -> Self {
        let (sin_c, cos_c) = config.rotation.sin_cos();
        Self {
            config,
            cos_c,
            sin_c,
        }
    }

    fn semi_axes(&self, step: u64) -> (f64, f64) {
        let [ra, rb] = self.config.semi_axis_rates;
        (step as f64 * ra, step as f64 * rb)
    }

    /// Normalized quadratic form, `None` while the ellipse is degenerate.
    fn quadratic_form(&self, p: Vector2<f64>, step: u64) -> Option<f64> {
        let (a, b) = self.semi_axes(step);
        if a == 0.0 || b == 0.0 {
            return None;
        }
        let u = (p.x * self.cos_c - p.y * self.sin_c) / a;
        let v = (p.x * self.cos_c + p.y * self.sin_c) / b;
        Some(u * u + v * v)
    }
}

impl FieldModel for WaveModel {
    fn name(&self) -> &str {
        "wave"
    }

    fn sample(&self, p: Vector2<f64>, step: u64) -> f64 {
        match self.quadratic_form(p, step) {
            Some(q) if q <= 1.0 => q,
            _ => 0.0,
        }
    }
}
