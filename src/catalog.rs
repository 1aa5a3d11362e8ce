//! Emoji catalog: emoji names with their reference colors.

use crate::budget::text_len;
use crate::matcher;
use crate::{MosaicError, Result};
use image::{GenericImageView, Rgb};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One emoji and the color it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiEntry {
    pub name: String,
    pub color: [u8; 3],
}

impl EmojiEntry {
    pub fn new(name: impl Into<String>, color: [u8; 3]) -> Self {
        Self { name: name.into(), color }
    }

    pub fn rgb(&self) -> Rgb<u8> {
        Rgb(self.color)
    }
}

/// Documents are either a bare list or a listing with an `emojis` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<serde_json::Value>),
    Listing { emojis: Vec<serde_json::Value> },
}

/// Raw entries of a catalog document or an emoji listing, unvalidated.
pub(crate) fn parse_document(json: &str) -> Result<Vec<serde_json::Value>> {
    let doc: Document =
        serde_json::from_str(json).map_err(|e| MosaicError::CatalogFormat(e.to_string()))?;
    Ok(match doc {
        Document::List(v) | Document::Listing { emojis: v } => v,
    })
}

/// Case-insensitive substring match; no keywords keeps everything.
/// `keywords` must already be lowercase.
pub(crate) fn matches_keywords(name: &str, keywords: &[String]) -> bool {
    let name = name.to_lowercase();
    keywords.is_empty() || keywords.iter().any(|k| name.contains(k.as_str()))
}

/// Non-empty, immutable emoji catalog. Order is preserved and decides ties.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<EmojiEntry>,
    avg_name_len: f64,
}

impl Catalog {
    pub fn from_entries(entries: Vec<EmojiEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(MosaicError::EmptyCatalog);
        }
        let total: usize = entries.iter().map(|e| text_len(&e.name)).sum();
        let avg_name_len = total as f64 / entries.len() as f64;
        Ok(Self { entries, avg_name_len })
    }

    /// Read and validate a catalog document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| MosaicError::CatalogLoad(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries = parse_document(json)?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let entry: EmojiEntry = serde_json::from_value(value)
                    .map_err(|e| MosaicError::CatalogFormat(format!("entry {i}: {e}")))?;
                if entry.name.is_empty() {
                    return Err(MosaicError::CatalogFormat(format!("entry {i}: empty name")));
                }
                Ok(entry)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_entries(entries)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.entries)
            .map_err(|e| MosaicError::CatalogFormat(e.to_string()))
    }

    /// Build a catalog from a directory of emoji images.
    ///
    /// Each image becomes `:<stem>:` with its alpha-weighted mean color. With
    /// non-empty `keywords`, only stems containing one of them (case-insensitive)
    /// are kept.
    pub fn build_from_dir(dir: impl AsRef<Path>, keywords: &[String]) -> Result<Self> {
        let dir = dir.as_ref();
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut entries = Vec::new();
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !matches_keywords(stem, &keywords) {
                continue;
            }

            let image = match image::open(&path) {
                Ok(image) => image,
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    continue;
                }
            };
            match mean_color(&image) {
                Some(color) => {
                    debug!("{stem}: {color:?}");
                    entries.push(EmojiEntry::new(format!(":{stem}:"), color));
                }
                None => warn!("skipping {}: fully transparent", path.display()),
            }
        }

        Self::from_entries(entries)
    }

    pub fn entries(&self) -> &[EmojiEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean name length in UTF-16 code units.
    pub fn avg_name_len(&self) -> f64 {
        self.avg_name_len
    }

    pub fn best_match(&self, sample: Rgb<u8>) -> &EmojiEntry {
        // entries is non-empty by construction
        &self.entries[matcher::best_index(sample, &self.entries).unwrap_or(0)]
    }
}

/// Alpha-weighted mean RGB, `None` if every pixel is transparent.
pub fn mean_color(image: &impl GenericImageView<Pixel = image::Rgba<u8>>) -> Option<[u8; 3]> {
    let mut sums = [0u64; 3];
    let mut weight = 0u64;
    for (_, _, px) in image.pixels() {
        let [r, g, b, a] = px.0;
        let a = a as u64;
        sums[0] += r as u64 * a;
        sums[1] += g as u64 * a;
        sums[2] += b as u64 * a;
        weight += a;
    }
    if weight == 0 {
        return None;
    }
    Some(sums.map(|s| ((s + weight / 2) / weight) as u8))
}
