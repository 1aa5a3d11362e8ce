//! Image sampling - downscales an image to one pixel per mosaic cell.

use crate::grid::GridSpec;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

/// Resampling filter used to shrink the source image onto the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
pub enum Resample {
    Nearest,
    /// Bilinear, what a browser canvas uses when drawing scaled.
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<Resample> for FilterType {
    fn from(r: Resample) -> Self {
        match r {
            Resample::Nearest => FilterType::Nearest,
            Resample::Triangle => FilterType::Triangle,
            Resample::CatmullRom => FilterType::CatmullRom,
            Resample::Gaussian => FilterType::Gaussian,
            Resample::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// One RGB sample per grid cell.
pub struct CellSampler {
    cells: RgbImage,
}

impl CellSampler {
    /// Shrink `image` onto the grid the way a cleared canvas would: resampling
    /// runs on premultiplied alpha and fully transparent cells read as black.
    pub fn new(image: &DynamicImage, spec: &GridSpec, resample: Resample) -> Self {
        if spec.cols == 0 || spec.rows == 0 {
            return Self { cells: RgbImage::new(0, 0) };
        }

        let mut rgba = image.to_rgba8();
        for px in rgba.pixels_mut() {
            let a = px[3] as u32;
            for c in &mut px.0[..3] {
                *c = ((*c as u32 * a + 127) / 255) as u8;
            }
        }
        let rgba = if rgba.dimensions() == (spec.cols, spec.rows) {
            rgba
        } else {
            imageops::resize(&rgba, spec.cols, spec.rows, resample.into())
        };

        let cells = RgbImage::from_fn(spec.cols, spec.rows, |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            Rgb([r, g, b].map(|c| unpremultiply(c, a)))
        });
        Self { cells }
    }

    /// Use an image that is already at grid resolution.
    pub fn from_cells(cells: RgbImage) -> Self {
        Self { cells }
    }

    pub fn cols(&self) -> u32 {
        self.cells.width()
    }

    pub fn rows(&self) -> u32 {
        self.cells.height()
    }

    pub fn sample(&self, col: u32, row: u32) -> Rgb<u8> {
        *self.cells.get_pixel(col, row)
    }
}

fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let a = a as u32;
    ((c as u32 * 255 + a / 2) / a).min(255) as u8
}
