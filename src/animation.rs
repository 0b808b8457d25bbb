//! Looping GIF assembly from rendered frames.

use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::config::AnimationConfig;
use crate::error::{Error, Result};
use crate::sequence::{ensure_dir, Progress};

pub const EXTENSION: &str = "gif";

fn animation_name(prefix: &str, n: usize) -> String {
    format!("{}_{}.{}", prefix, n, EXTENSION)
}

fn is_animation_of(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .map_or(false, |rest| rest.ends_with(".gif"))
}

/// `<prefix>_<N>.gif` where N is one more than the number of existing
/// `<prefix>_*.gif` files in `dir`, moved past any name already taken.
pub fn next_animation_path(dir: &Path, prefix: &str) -> Result<PathBuf> {
    let existing = match fs::read_dir(dir) {
        Ok(entries) => {
            let mut count = 0;
            for entry in entries {
                let entry = entry?;
                if is_animation_of(&entry.file_name().to_string_lossy(), prefix) {
                    count += 1;
                }
            }
            count
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
        Err(e) => return Err(e.into()),
    };

    let mut n = existing + 1;
    while dir.join(animation_name(prefix, n)).exists() {
        n += 1;
    }
    Ok(dir.join(animation_name(prefix, n)))
}

/// Stream `frames` in order into a new looping GIF under `dir`.
///
/// The output file is created fresh; an existing file is never replaced.
/// The encoder lives only for the append loop and the file is flushed
/// before the path is returned.
pub fn assemble(
    frames: &[PathBuf],
    dir: &Path,
    prefix: &str,
    config: &AnimationConfig,
    progress: &mut dyn Progress,
) -> Result<PathBuf> {
    if frames.is_empty() {
        return Err(Error::animation("no frames to assemble"));
    }
    ensure_dir(dir)?;

    let path = next_animation_path(dir, prefix)?;
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("failed to create animation '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);

    let delay = Delay::from_numer_denom_ms(config.frame_delay_ms, 1);
    let total = frames.len();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut writer, config.quantize_speed);
        encoder.set_repeat(Repeat::Infinite)?;

        let mut size = None;
        for (k, frame_path) in frames.iter().enumerate() {
            let img = image::open(frame_path)?.into_rgba8();

            let dims = img.dimensions();
            match size {
                None => size = Some(dims),
                Some(first) if first != dims => {
                    return Err(Error::animation(format!(
                        "frame '{}' is {}x{}, expected {}x{}",
                        frame_path.display(),
                        dims.0,
                        dims.1,
                        first.0,
                        first.1
                    )))
                }
                Some(_) => {}
            }

            encoder.encode_frame(Frame::from_parts(img, 0, 0, delay))?;
            progress.advance(k + 1, total);
        }
    }
    writer.flush()?;
    progress.finish();

    tracing::info!(path = %path.display(), frames = total, "created animation");
    Ok(path)
}

/// Frames in `dir` with the given extension, oldest first by creation time.
///
/// Falls back to modification time where the filesystem does not record
/// creation. Ties are broken by name.
pub fn discover_frames(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read frame directory '{}'", dir.display()))?;

    let mut frames: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension() != Some(OsStr::new(extension)) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let created = meta.created().or_else(|_| meta.modified())?;
        frames.push((created, path));
    }

    frames.sort();
    Ok(frames.into_iter().map(|(_, p)| p).collect())
}
