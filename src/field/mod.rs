//! Analytic scalar fields over the unit square.

use cgmath::Vector2;

use crate::config::Config;

mod cone;
mod heart;
mod wave;

pub use cone::ConeModel;
pub use heart::HeartModel;
pub use wave::WaveModel;

/// Scalar intensity at a point of the domain for a given time step.
///
/// Implementations hold only their constants, so sampling is pure and
/// may happen in any order.
pub trait FieldModel {
    /// Short lowercase name, used in frame and animation file names.
    fn name(&self) -> &str;

    fn sample(&self, p: Vector2<f64>, step: u64) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Cone,
    Wave,
    Heart,
}

impl ModelKind {
    pub fn build(self, config: &Config) -> Box<dyn FieldModel> {
        match self {
            ModelKind::Cone => Box::new(ConeModel::new(config.cone.clone())),
            ModelKind::Wave => Box::new(WaveModel::new(config.wave.clone())),
            ModelKind::Heart => Box::new(HeartModel::new(config.heart.clone())),
        }
    }
}
