//! Image to emoji mosaic converter with a hard output-character budget.

pub mod budget;
pub mod catalog;
#[cfg(not(target_arch = "wasm32"))]
pub mod download;
pub mod grid;
pub mod matcher;
pub mod render;
pub mod sample;
pub mod session;
pub mod status;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use budget::{text_len, BudgetPolicy};
pub use catalog::{Catalog, EmojiEntry};
pub use grid::GridSpec;
pub use sample::Resample;
pub use session::Session;
pub use status::{Status, Verdict};

use thiserror::Error;

/// Default output budget, in UTF-16 code units.
pub const DEFAULT_BUDGET: usize = 3000;

#[derive(Error, Debug)]
pub enum MosaicError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not load emoji catalog: {0}")]
    CatalogLoad(String),
    #[error("Malformed emoji catalog: {0}")]
    CatalogFormat(String),
    #[error("Emoji catalog is empty or not loaded")]
    EmptyCatalog,
    #[error("No image selected")]
    NoImageSelected,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[cfg(not(target_arch = "wasm32"))]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request to {url} failed with status {status}")]
    RequestFailed { url: String, status: u16 },
}

pub type Result<T> = std::result::Result<T, MosaicError>;

/// A finished mosaic together with the numbers needed for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Mosaic {
    pub text: String,
    pub grid: GridSpec,
    /// Length of `text` after post-processing.
    pub length: usize,
    pub truncated: bool,
    pub over_budget: bool,
}

/// Main converter: optimizer, matcher, renderer and budget enforcement.
pub struct Converter {
    catalog: Catalog,
    budget: usize,
    policy: BudgetPolicy,
    resample: Resample,
}

impl Converter {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            budget: DEFAULT_BUDGET,
            policy: BudgetPolicy::default(),
            resample: Resample::default(),
        }
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_policy(mut self, policy: BudgetPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_resample(mut self, resample: Resample) -> Self {
        self.resample = resample;
        self
    }

    pub fn set_budget(&mut self, budget: usize) {
        self.budget = budget;
    }

    pub fn set_policy(&mut self, policy: BudgetPolicy) {
        self.policy = policy;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn policy(&self) -> BudgetPolicy {
        self.policy
    }

    /// Grid the optimizer picks for an image of the given pixel size.
    pub fn plan(&self, img_w: u32, img_h: u32) -> GridSpec {
        grid::optimal_size(
            img_w as f64,
            img_h as f64,
            self.catalog.avg_name_len(),
            self.budget,
        )
    }

    /// Render `image` on an already planned grid and enforce the budget.
    pub fn convert_with(&self, image: &image::DynamicImage, spec: GridSpec) -> Mosaic {
        let raw = render::render(image, &spec, &self.catalog, self.resample);
        let enforced = budget::enforce(raw, self.budget, self.policy);
        let length = text_len(&enforced.text);

        Mosaic {
            text: enforced.text,
            grid: spec,
            length,
            truncated: enforced.truncated,
            over_budget: length > self.budget,
        }
    }

    pub fn convert(&self, image: &image::DynamicImage) -> Mosaic {
        let spec = self.plan(image.width(), image.height());
        self.convert_with(image, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

    fn squares() -> Catalog {
        Catalog::from_entries(vec![
            EmojiEntry::new("🟥", [255, 0, 0]),
            EmojiEntry::new("🟦", [0, 0, 255]),
        ])
        .unwrap()
    }

    #[test]
    fn test_convert_stays_within_budget() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, Rgb([240, 10, 10])));
        let mosaic = Converter::new(squares()).convert(&image);

        assert!(mosaic.grid.cols >= 5 && mosaic.grid.cols <= 100);
        assert!(mosaic.length <= DEFAULT_BUDGET);
        assert!(!mosaic.truncated);
        assert!(!mosaic.over_budget);
        assert!(mosaic.text.lines().all(|l| l.chars().all(|c| c == '🟥')));
    }

    #[test]
    fn test_small_budget_truncates() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([0, 0, 250])));
        let converter = Converter::new(squares()).with_budget(150);
        let spec = GridSpec::new(10, 10, 2.0);
        let mosaic = converter.convert_with(&image, spec);

        assert!(mosaic.truncated);
        assert!(mosaic.length <= 150);
        assert!(mosaic.text.ends_with(budget::TRUNCATION_MARKER));
    }

    #[test]
    fn test_transparent_pixels_match_black() {
        let catalog = Catalog::from_entries(vec![
            EmojiEntry::new("B", [0, 0, 0]),
            EmojiEntry::new("W", [255, 255, 255]),
        ])
        .unwrap();
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0])));
        let mosaic = Converter::new(catalog).convert_with(&image, GridSpec::new(2, 2, 1.0));
        assert_eq!(mosaic.text, "BB\nBB\n");
    }

    #[test]
    fn test_budget_smaller_than_marker() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([250, 0, 0])));
        let mosaic = Converter::new(squares())
            .with_budget(10)
            .convert_with(&image, GridSpec::new(5, 5, 2.0));
        assert!(mosaic.truncated);
        assert!(!mosaic.over_budget);
        assert!(mosaic.length <= 10);
    }

    #[test]
    fn test_report_only_flags_overage() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([0, 0, 250])));
        let converter = Converter::new(squares())
            .with_budget(150)
            .with_policy(BudgetPolicy::ReportOnly);
        let mosaic = converter.convert_with(&image, GridSpec::new(10, 10, 2.0));

        assert!(!mosaic.truncated);
        assert!(mosaic.over_budget);
        assert_eq!(mosaic.length, 10 * (10 * 2 + 1));
    }
}
