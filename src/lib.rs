//! Time-varying scalar field visualization.
//!
//! A [`field::FieldModel`] is sampled on a regular grid by [`grid::sample`],
//! every step is drawn as a heatmap by [`render::FrameRenderer`], and
//! [`animation::assemble`] streams the frames into a looping GIF.
//! [`pipeline`] wires the pieces together for the two run modes.

pub mod animation;
pub mod config;
pub mod data;
pub mod error;
pub mod field;
pub mod grid;
pub mod pipeline;
pub mod render;
pub mod sequence;

pub use config::Config;
pub use error::{Error, Result};
pub use grid::IntensityMatrix;
