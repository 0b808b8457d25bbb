//! End-to-end runs: frames first, then one animation from exactly those frames.

use std::path::{Path, PathBuf};

use crate::animation;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::field::ModelKind;
use crate::render::FrameRenderer;
use crate::sequence::{self, Progress, SkippedFrame};

/// Extension of the input files picked up by [`run_files`].
pub const DATA_EXTENSION: &str = "data";

/// Animation prefix for file-driven runs.
pub const DATA_PREFIX: &str = "data";

/// Where a run writes. Nothing is resolved against the working directory.
#[derive(Clone, Debug)]
pub struct OutputDirs {
    pub frames: PathBuf,
    pub animations: PathBuf,
}

impl OutputDirs {
    pub fn new(frames: impl Into<PathBuf>, animations: impl Into<PathBuf>) -> Self {
        Self {
            frames: frames.into(),
            animations: animations.into(),
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    /// Rendered frames, in the order they appear in the animation.
    pub frames: Vec<PathBuf>,
    pub skipped: Vec<SkippedFrame>,
    pub animation: PathBuf,
}

fn prefix<'a>(config: &'a Config, default: &'a str) -> &'a str {
    config.animation.prefix.as_deref().unwrap_or(default)
}

/// Sweep `kind` over the configured steps and assemble the result.
#[tracing::instrument(skip(config, dirs, progress))]
pub fn run_sweep(
    kind: ModelKind,
    config: &Config,
    dirs: &OutputDirs,
    progress: &mut dyn Progress,
) -> Result<RunSummary> {
    config.validate()?;

    let model = kind.build(config);
    let renderer = FrameRenderer::new(config.render.clone())?;

    let report = sequence::render_sweep(
        model.as_ref(),
        &config.grid,
        &config.sweep,
        &renderer,
        &dirs.frames,
        progress,
    )?;
    tracing::info!(frames = report.frames.len(), dir = %dirs.frames.display(), "heatmaps created");

    let animation = animation::assemble(
        &report.frames,
        &dirs.animations,
        prefix(config, model.name()),
        &config.animation,
        progress,
    )?;

    Ok(RunSummary {
        frames: report.frames,
        skipped: report.skipped,
        animation,
    })
}

/// Render every data file of `input_dir`, oldest first, and assemble the result.
#[tracing::instrument(skip(config, dirs, progress))]
pub fn run_files(
    input_dir: &Path,
    config: &Config,
    dirs: &OutputDirs,
    progress: &mut dyn Progress,
) -> Result<RunSummary> {
    let files = sequence::discover_data_files(input_dir, DATA_EXTENSION)?;
    run_file_list(&files, config, dirs, progress)
}

/// Like [`run_files`] for an explicit, already ordered list of data files.
pub fn run_file_list(
    files: &[PathBuf],
    config: &Config,
    dirs: &OutputDirs,
    progress: &mut dyn Progress,
) -> Result<RunSummary> {
    config.validate()?;

    let renderer = FrameRenderer::new(config.render.clone())?;
    let report = sequence::render_files(files, &renderer, &dirs.frames, progress)?;
    tracing::info!(
        frames = report.frames.len(),
        skipped = report.skipped.len(),
        dir = %dirs.frames.display(),
        "heatmaps created"
    );

    if report.frames.is_empty() {
        return Err(Error::animation(format!(
            "none of the {} data files produced a frame",
            files.len()
        )));
    }

    let animation = animation::assemble(
        &report.frames,
        &dirs.animations,
        prefix(config, DATA_PREFIX),
        &config.animation,
        progress,
    )?;

    Ok(RunSummary {
        frames: report.frames,
        skipped: report.skipped,
        animation,
    })
}
