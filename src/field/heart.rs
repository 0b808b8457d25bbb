use cgmath::{vec2, InnerSpace, Vector2};

use super::FieldModel;
use crate::config::HeartConfig;

const LOBE_RADIUS: f64 = 0.2;
const LOBE_Y: f64 = 0.6;
/// Where the lobes meet the wedge.
const WAIST_Y: f64 = 0.6233;

/// Static heart-shaped initial condition, constant over time.
///
/// Two circular lobes above the waist, a wedge pointing down below it.
#[derive(Clone, Debug)]
pub struct HeartModel {
    config: HeartConfig,
}

impl HeartModel {
    pub fn new(config: HeartConfig) -> Self {
        Self { config }
    }

    pub fn contains(p: Vector2<f64>) -> bool {
        let in_lobe = |cx: f64| (p - vec2(cx, LOBE_Y)).magnitude2() <= LOBE_RADIUS * LOBE_RADIUS;

        if p.y > WAIST_Y {
            in_lobe(0.3) || in_lobe(0.7)
        } else {
            p.y >= -1.25 * p.x + 0.75 && p.y >= 1.25 * p.x - 0.5
        }
    }
}

impl FieldModel for HeartModel {
    fn name(&self) -> &str {
        "heart"
    }

    fn sample(&self, p: Vector2<f64>, _step: u64) -> f64 {
        if Self::contains(p) {
            self.config.level
        } else {
            0.0
        }
    }
}
