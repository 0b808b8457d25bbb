use std::f64::consts::PI;

use cgmath::Vector2;

use super::FieldModel;
use crate::config::ConeConfig;

/// Shockwave travelling up from `(center_x, 0)` inside a cone.
///
/// Dark until `activation_step`, then a front of radius `tau` expands.
/// Intensity peaks on the front, fades linearly behind it and falls off
/// with the angle from the cone axis. Edges are sharp: everything outside
/// the cone or ahead of the front is exactly zero.
#[derive(Clone, Debug)]
pub struct ConeModel {
    config: ConeConfig,
    max_alpha: f64,
}

impl ConeModel {
    pub fn new(config: ConeConfig) -> Self {
        Self {
            max_alpha: PI / config.cone_limiter,
            config,
        }
    }

    /// Normalized time since activation, `None` while the cone is dark.
    fn elapsed(&self, step: u64) -> Option<f64> {
        let c = &self.config;
        if step <= c.activation_step {
            return None;
        }
        let t0 = c.activation_step as f64;
        Some((step as f64 - t0) / (c.max_step as f64 / c.speed - t0))
    }
}

impl FieldModel for ConeModel {
    fn name(&self) -> &str {
        "cone"
    }

    fn sample(&self, p: Vector2<f64>, step: u64) -> f64 {
        let c = &self.config;

        let tau = match self.elapsed(step) {
            Some(tau) if tau > 0.0 => tau,
            _ => return 0.0,
        };

        if p.y > tau {
            return 0.0;
        }

        let x_prim = (c.center_x - p.x).abs();
        let alpha = (x_prim / tau).atan();
        if alpha >= self.max_alpha {
            return 0.0;
        }

        let front = (tau * tau - x_prim * x_prim).sqrt();
        if p.y > front {
            return 0.0;
        }

        let depth = ((front - p.y).max(0.0) * c.shockwave_shortness).min(1.0);

        (1.0 - depth) * (alpha * c.cone_limiter * 0.5).cos() * c.strength
    }
}
