//! Drives the renderer once per time step, in time order.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context as _;

use crate::config::{GridConfig, SweepConfig};
use crate::error::{Error, Result};
use crate::field::FieldModel;
use crate::grid;
use crate::render::FrameRenderer;

/// Observer for per-frame progress. Purely informational.
pub trait Progress {
    fn advance(&mut self, done: usize, total: usize);

    fn finish(&mut self) {}
}

/// Single updating `done / total` line on stderr.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    active: bool,
}

impl Progress for ConsoleProgress {
    fn advance(&mut self, done: usize, total: usize) {
        self.active = true;
        eprint!("\r {} / {}", done, total);
    }

    fn finish(&mut self) {
        if self.active {
            eprintln!();
            self.active = false;
        }
    }
}

#[derive(Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&mut self, _done: usize, _total: usize) {}
}

/// A frame that could not be produced and was left out of the run.
#[derive(Debug)]
pub struct SkippedFrame {
    pub source: PathBuf,
    pub error: Error,
}

/// Frames written by one pass, in time order.
#[derive(Debug, Default)]
pub struct SequenceReport {
    pub frames: Vec<PathBuf>,
    pub skipped: Vec<SkippedFrame>,
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
    Ok(())
}

impl SweepConfig {
    /// `0, stride, 2 * stride, ...` below `max_step`.
    pub fn steps(&self) -> impl Iterator<Item = u64> {
        (0..self.max_step).step_by(self.stride.max(1) as usize)
    }
}

pub fn frame_name(label: &str, step: u64, extension: &str) -> String {
    format!("{}_{:06}.{}", label, step, extension)
}

/// Sample and render every swept step of `model` into `frames_dir`.
pub fn render_sweep(
    model: &dyn FieldModel,
    grid: &GridConfig,
    sweep: &SweepConfig,
    renderer: &FrameRenderer,
    frames_dir: &Path,
    progress: &mut dyn Progress,
) -> Result<SequenceReport> {
    ensure_dir(frames_dir)?;

    let steps: Vec<u64> = sweep.steps().collect();
    let total = steps.len();
    let mut report = SequenceReport::default();

    for (k, step) in steps.into_iter().enumerate() {
        let matrix = grid::sample(model, grid.size, step);
        let path = frames_dir.join(frame_name(model.name(), step, renderer.extension()));
        let title = format!("{} step {}", model.name(), step);

        renderer.write(&matrix, &title, &path)?;
        tracing::debug!(step, path = %path.display(), "rendered frame");

        report.frames.push(path);
        progress.advance(k + 1, total);
    }
    progress.finish();

    Ok(report)
}

/// Render data files in the given order. Missing or malformed files are
/// logged and skipped; any other failure aborts. A file whose stem was
/// already rendered in this pass gets a `_2`, `_3`, ... suffix.
pub fn render_files(
    files: &[PathBuf],
    renderer: &FrameRenderer,
    frames_dir: &Path,
    progress: &mut dyn Progress,
) -> Result<SequenceReport> {
    ensure_dir(frames_dir)?;

    let total = files.len();
    let mut report = SequenceReport::default();
    let mut taken = HashSet::new();

    for (k, file) in files.iter().enumerate() {
        let rendered = renderer.data_frame_path(file, frames_dir).and_then(|out| {
            let out = unclaimed(out, &taken);
            renderer.render_data_file_to(file, &out).map(|()| out)
        });

        match rendered {
            Ok(path) => {
                tracing::debug!(source = %file.display(), path = %path.display(), "rendered frame");
                taken.insert(path.clone());
                report.frames.push(path);
            }
            Err(error) if error.is_recoverable() => {
                tracing::warn!(source = %file.display(), %error, "skipping frame");
                report.skipped.push(SkippedFrame {
                    source: file.clone(),
                    error,
                });
            }
            Err(error) => return Err(error),
        }
        progress.advance(k + 1, total);
    }
    progress.finish();

    Ok(report)
}

/// `path`, or `<stem>_<k>.<ext>` with the smallest `k >= 2` not in `taken`.
fn unclaimed(path: PathBuf, taken: &HashSet<PathBuf>) -> PathBuf {
    if !taken.contains(&path) {
        return path;
    }

    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let ext = path.extension().unwrap_or_default().to_string_lossy();
    let mut k = 2;
    loop {
        let candidate = path.with_file_name(format!("{stem}_{k}.{ext}"));
        if !taken.contains(&candidate) {
            return candidate;
        }
        k += 1;
    }
}

/// Files in `dir` with the given extension, oldest modification first.
/// A missing `dir` is created and yields no files.
pub fn discover_data_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read input directory '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension() == Some(OsStr::new(extension)) {
            files.push(path);
        }
    }

    Ok(order_by_modified(files))
}

/// Sort by modification time, ties by path. Entries whose metadata cannot
/// be read keep their relative order at the end.
pub fn order_by_modified(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let (mut dated, undated): (Vec<_>, Vec<_>) = paths
        .into_iter()
        .map(|p| (modified(&p), p))
        .partition(|(t, _)| t.is_some());

    dated.sort_by(|(ta, pa), (tb, pb)| ta.cmp(tb).then_with(|| pa.cmp(pb)));

    dated
        .into_iter()
        .chain(undated)
        .map(|(_, p)| p)
        .collect()
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
