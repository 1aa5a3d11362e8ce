//! Nearest-color matching by Euclidean RGB distance.

use crate::catalog::EmojiEntry;
use image::Rgb;

/// Euclidean distance between two RGB colors.
pub fn color_distance(a: Rgb<u8>, b: Rgb<u8>) -> f64 {
    (distance_sq(a, b) as f64).sqrt()
}

fn distance_sq(a: Rgb<u8>, b: Rgb<u8>) -> u32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = x.abs_diff(y) as u32;
            d * d
        })
        .sum()
}

/// Index of the closest entry; the first one wins ties. `None` for an empty slice.
pub fn best_index(sample: Rgb<u8>, entries: &[EmojiEntry]) -> Option<usize> {
    // Squared distances order the same way as distances and are exact.
    let mut best = None;
    let mut best_dist = u32::MAX;
    for (i, entry) in entries.iter().enumerate() {
        let d = distance_sq(sample, entry.rgb());
        if best.is_none() || d < best_dist {
            best = Some(i);
            best_dist = d;
        }
    }
    best
}

pub fn best_match(sample: Rgb<u8>, entries: &[EmojiEntry]) -> Option<&EmojiEntry> {
    best_index(sample, entries).map(|i| &entries[i])
}
