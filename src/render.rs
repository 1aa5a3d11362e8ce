//! Mosaic renderer: row-major emoji text, one newline-terminated line per grid row.

use crate::catalog::Catalog;
use crate::grid::GridSpec;
use crate::sample::{CellSampler, Resample};
use image::DynamicImage;

pub fn render(image: &DynamicImage, spec: &GridSpec, catalog: &Catalog, resample: Resample) -> String {
    render_cells(&CellSampler::new(image, spec, resample), catalog)
}

/// Match every cell left to right, top to bottom.
pub fn render_cells(cells: &CellSampler, catalog: &Catalog) -> String {
    let mut text = String::new();
    for y in 0..cells.rows() {
        for x in 0..cells.cols() {
            text.push_str(&catalog.best_match(cells.sample(x, y)).name);
        }
        text.push('\n');
    }
    text
}
