//! Heatmap frames with axes, title and colorbar.

use std::ops::Range;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use ndarray::Array1;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::data;
use crate::error::{Error, Result};
use crate::grid::IntensityMatrix;

mod colormap;

pub use colormap::Colormap;

/// Rows above the plot. Only the title differs between frames here.
pub const TITLE_BAND: u32 = 36;
const MARGIN: u32 = 8;
const X_LABEL_AREA: u32 = 40;
const Y_LABEL_AREA: u32 = 52;
/// Columns right of the plot holding the colorbar and its labels.
const COLORBAR_AREA: u32 = 96;
const COLORBAR_STEPS: usize = 64;

const FONT: &str = "sans-serif";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    Jpeg,
    Png,
}

impl FrameFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FrameFormat::Jpeg => "jpg",
            FrameFormat::Png => "png",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            FrameFormat::Jpeg => ImageFormat::Jpeg,
            FrameFormat::Png => ImageFormat::Png,
        }
    }
}

/// Draws intensity matrices with a fixed value range so every frame of a
/// run shares one color scale.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    config: RenderConfig,
}

impl FrameRenderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn extension(&self) -> &'static str {
        self.config.format.extension()
    }

    /// Pixel columns and rows of the heatmap cells.
    pub fn plot_area(&self) -> (Range<u32>, Range<u32>) {
        let (width, height) = (self.config.width, self.config.height);
        (
            MARGIN + Y_LABEL_AREA..width - COLORBAR_AREA - MARGIN,
            TITLE_BAND + MARGIN..height - MARGIN - X_LABEL_AREA,
        )
    }

    /// Rasterize one frame. The backend borrows the pixel buffer only for this call.
    pub fn render(&self, matrix: &IntensityMatrix, title: &str) -> Result<RgbImage> {
        let (width, height) = (self.config.width, self.config.height);
        let mut buf = vec![0u8; width as usize * height as usize * 3];

        self.draw(&mut buf, matrix, title)
            .map_err(|e| Error::render(format!("failed to draw frame '{title}': {e}")))?;

        RgbImage::from_raw(width, height, buf)
            .ok_or_else(|| Error::render(format!("frame buffer does not match {width}x{height}")))
    }

    /// Render and encode to `path` in the configured format.
    pub fn write(&self, matrix: &IntensityMatrix, title: &str, path: &Path) -> Result<()> {
        let img = self.render(matrix, title)?;
        img.save_with_format(path, self.config.format.image_format())?;
        Ok(())
    }

    /// Render a data file into `out_dir`, named and titled after the file stem.
    pub fn render_data_file(&self, path: &Path, out_dir: &Path) -> Result<PathBuf> {
        let out = self.data_frame_path(path, out_dir)?;
        self.render_data_file_to(path, &out)?;
        Ok(out)
    }

    /// `<out_dir>/<stem>.<ext>` for the data file at `path`.
    pub fn data_frame_path(&self, path: &Path, out_dir: &Path) -> Result<PathBuf> {
        Ok(out_dir.join(format!("{}.{}", data_stem(path)?, self.extension())))
    }

    /// Render a data file to an explicit output path, titled after the file stem.
    pub fn render_data_file_to(&self, path: &Path, out: &Path) -> Result<()> {
        let matrix = data::read_triples(path)?;
        self.write(&matrix, &data_stem(path)?, out)
    }

    fn normalize(&self, v: f64) -> f64 {
        let [min, max] = self.config.value_range;
        (v - min) / (max - min)
    }

    fn color(&self, t: f64) -> RGBColor {
        let [r, g, b] = self.config.colormap.map(t);
        RGBColor(r, g, b)
    }

    fn draw(&self, buf: &mut [u8], matrix: &IntensityMatrix, title: &str) -> DrawResult<()> {
        let (width, height) = (self.config.width, self.config.height);
        let root = BitMapBackend::with_buffer(buf, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (band, body) = root.split_vertically(TITLE_BAND);
        if !title.is_empty() {
            band.titled(title, (FONT, 20))?;
        }

        let (plot, bar) = body.split_horizontally(width - COLORBAR_AREA);
        self.draw_cells(&plot, matrix)?;
        self.draw_colorbar(&bar)?;

        root.present()?;
        Ok(())
    }

    // One rectangle per sample, x left to right, y bottom to top.
    fn draw_cells(&self, area: &Area<'_>, matrix: &IntensityMatrix) -> DrawResult<()> {
        let xe = cell_edges(&matrix.xs);
        let ye = cell_edges(&matrix.ys);
        let (nx, ny) = matrix.dim();

        let mut chart = ChartBuilder::on(area)
            .margin(MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(xe[0]..xe[nx], ye[0]..ye[ny])?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(3)
            .y_labels(3)
            .x_label_formatter(&|v: &f64| tick_label(*v))
            .y_label_formatter(&|v: &f64| tick_label(*v))
            .x_desc("X")
            .y_desc("Y")
            .label_style((FONT, 12))
            .axis_desc_style((FONT, 14))
            .draw()?;

        let (xe, ye) = (&xe, &ye);
        chart.draw_series((0..nx).flat_map(move |i| {
            (0..ny).map(move |j| {
                let t = self.normalize(matrix.values[[i, j]]);
                Rectangle::new([(xe[i], ye[j]), (xe[i + 1], ye[j + 1])], self.color(t).filled())
            })
        }))?;

        Ok(())
    }

    // Same margins as the plot so the bar lines up with it.
    fn draw_colorbar(&self, area: &Area<'_>) -> DrawResult<()> {
        let [min, max] = self.config.value_range;

        let mut chart = ChartBuilder::on(area)
            .margin(MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(0.0..1.0, min..max)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(3)
            .y_label_formatter(&|v: &f64| tick_label(*v))
            .y_desc("VALUE")
            .label_style((FONT, 12))
            .axis_desc_style((FONT, 14))
            .draw()?;

        let step = (max - min) / COLORBAR_STEPS as f64;
        chart.draw_series((0..COLORBAR_STEPS).map(|k| {
            let lo = min + k as f64 * step;
            let t = (k as f64 + 0.5) / COLORBAR_STEPS as f64;
            Rectangle::new([(0.0, lo), (1.0, lo + step)], self.color(t).filled())
        }))?;

        Ok(())
    }
}

/// `n + 1` cell boundaries for `n` sorted samples. Each sample owns the
/// span up to the next one; the last reuses the previous spacing.
fn cell_edges(axis: &Array1<f64>) -> Vec<f64> {
    let n = axis.len();
    match n {
        0 => vec![0.0, 1.0],
        1 => vec![axis[0], axis[0] + 1.0],
        _ => {
            let mut edges = axis.to_vec();
            edges.push(axis[n - 1] + (axis[n - 1] - axis[n - 2]));
            edges
        }
    }
}

fn data_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| Error::malformed(path, "path has no file name"))
}

fn tick_label(v: f64) -> String {
    format!("{:.2}", v)
}
