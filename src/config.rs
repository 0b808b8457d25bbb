use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::{Colormap, FrameFormat};

/// Smallest frame that still leaves room for the plot next to the margins and colorbar.
pub const MIN_FRAME_WIDTH: u32 = 200;
pub const MIN_FRAME_HEIGHT: u32 = 160;

/// GIF delays are stored in centiseconds in a `u16`.
const MAX_FRAME_DELAY_MS: u32 = 655_350;

/// Every constant of a run. Built once, then only borrowed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub grid: GridConfig,
    pub sweep: SweepConfig,
    pub cone: ConeConfig,
    pub wave: WaveConfig,
    pub heart: HeartConfig,
    pub render: RenderConfig,
    pub animation: AnimationConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Samples per axis over the unit square.
    pub size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { size: 100 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Exclusive upper bound of the swept steps.
    pub max_step: u64,
    pub stride: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_step: 10_000,
            stride: 200,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConeConfig {
    /// The cone is dark up to and including this step.
    pub activation_step: u64,
    /// Step count the front speed is measured against. Independent of
    /// the sweep bound, so shortening a sweep does not stretch the cone.
    pub max_step: u64,
    pub speed: f64,
    /// The cone half-angle is `PI / cone_limiter`.
    pub cone_limiter: f64,
    pub shockwave_shortness: f64,
    pub strength: f64,
    pub center_x: f64,
}

impl Default for ConeConfig {
    fn default() -> Self {
        Self {
            activation_step: 7_000,
            max_step: 10_000,
            speed: 1.25,
            cone_limiter: 6.0,
            shockwave_shortness: 3.0,
            strength: 1.0,
            center_x: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveConfig {
    /// Rotation of the ellipse in radians.
    pub rotation: f64,
    /// Growth of the two semi-axes per step.
    pub semi_axis_rates: [f64; 2],
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            rotation: -0.6,
            semi_axis_rates: [10.0 / 70_000.0, 5.0 / 70_000.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeartConfig {
    /// Intensity inside the shape.
    pub level: f64,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self { level: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Fixed normalization range shared by every frame of a run.
    pub value_range: [f64; 2],
    pub colormap: Colormap,
    pub format: FrameFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            value_range: [0.0, 1.0],
            colormap: Colormap::Viridis,
            format: FrameFormat::Jpeg,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub frame_delay_ms: u32,
    /// NeuQuant sampling speed, 1 (best) to 30 (fastest).
    pub quantize_speed: i32,
    /// Overrides the mode-derived artifact prefix.
    pub prefix: Option<String>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_delay_ms: 100,
            quantize_speed: 10,
            prefix: None,
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid.size < 2 {
            return Err(Error::config("grid size must be at least 2"));
        }
        if self.sweep.stride == 0 {
            return Err(Error::config("sweep stride must be non-zero"));
        }
        self.cone.validate()?;
        self.wave.validate()?;
        if !self.heart.level.is_finite() {
            return Err(Error::config("heart level must be finite"));
        }
        self.render.validate()?;
        self.animation.validate()
    }
}

impl ConeConfig {
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.speed,
            self.cone_limiter,
            self.shockwave_shortness,
            self.strength,
            self.center_x,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::config("cone constants must be finite"));
        }
        if self.speed <= 0.0 {
            return Err(Error::config("cone speed must be positive"));
        }
        if self.cone_limiter <= 1.0 {
            return Err(Error::config("cone limiter must be greater than 1"));
        }
        if self.strength < 0.0 || self.shockwave_shortness < 0.0 {
            return Err(Error::config(
                "cone strength and shockwave shortness must not be negative",
            ));
        }
        if self.max_step as f64 / self.speed <= self.activation_step as f64 {
            return Err(Error::config(format!(
                "cone front never advances: max step {} / speed {} must exceed activation step {}",
                self.max_step, self.speed, self.activation_step
            )));
        }
        Ok(())
    }
}

impl WaveConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.rotation.is_finite() || self.semi_axis_rates.iter().any(|r| !r.is_finite()) {
            return Err(Error::config("wave constants must be finite"));
        }
        Ok(())
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_FRAME_WIDTH || self.height < MIN_FRAME_HEIGHT {
            return Err(Error::config(format!(
                "frame size {}x{} is below the minimum {}x{}",
                self.width, self.height, MIN_FRAME_WIDTH, MIN_FRAME_HEIGHT
            )));
        }
        let [min, max] = self.value_range;
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(Error::config(format!(
                "value range [{min}, {max}] must be finite and increasing"
            )));
        }
        Ok(())
    }
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_delay_ms > MAX_FRAME_DELAY_MS {
            return Err(Error::config(format!(
                "frame delay {} ms exceeds the GIF limit of {} ms",
                self.frame_delay_ms, MAX_FRAME_DELAY_MS
            )));
        }
        if !(1..=30).contains(&self.quantize_speed) {
            return Err(Error::config("quantize speed must be within 1..=30"));
        }
        if let Some(prefix) = &self.prefix {
            if prefix.is_empty() || prefix.contains(['/', '\\']) {
                return Err(Error::config(format!("invalid animation prefix '{prefix}'")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn stalled_cone_front_is_rejected() {
        // 10000 / 1.5 < 7000: the front would run backwards.
        let mut config = Config::default();
        config.cone.speed = 1.5;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("never advances"));
    }

    #[test]
    fn rejects_bad_ranges() {
        let mut config = Config::default();
        config.render.value_range = [1.0, 0.0];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sweep.stride = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.grid.size = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.render.width = 64;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.animation.prefix = Some("../escape".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "sweep": { "max_step": 400 }, "render": { "colormap": "grayscale" } }"#,
        )
        .unwrap();

        assert_eq!(config.sweep.max_step, 400);
        assert_eq!(config.sweep.stride, 200);
        assert_eq!(config.render.colormap, Colormap::Grayscale);
        assert_eq!(config.grid, GridConfig::default());
    }

    #[test]
    fn cone_and_sweep_bounds_are_separate() {
        let config: Config = serde_json::from_str(
            r#"{ "sweep": { "max_step": 400 }, "cone": { "max_step": 12000 } }"#,
        )
        .unwrap();

        assert_eq!(config.sweep.max_step, 400);
        assert_eq!(config.cone.max_step, 12_000);
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{ "grid": { "sise": 10 } }"#).is_err());
    }
}
