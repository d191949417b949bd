//! Plain-text rendering of the view for the terminal.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::api::SearchApi;
use crate::similarity::SimilarityService;
use crate::view::{ImageSearchView, Tab};

const TABS: [Tab; 3] = [Tab::Search, Tab::History, Tab::ForYou];

pub fn render<A: SearchApi, S: SimilarityService>(view: &ImageSearchView<A, S>) -> String {
    let mut out = String::new();

    let header: Vec<String> = TABS
        .iter()
        .map(|tab| {
            if *tab == view.tab() {
                format!("[{}]", tab)
            } else {
                format!(" {} ", tab)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", header.join("  "));

    if let Some(error) = view.error() {
        let _ = writeln!(out, "error: {}", error);
    }

    match view.tab() {
        Tab::Search => {
            if let Some(file) = view.selected_file() {
                let _ = writeln!(out, "uploaded: {} ({} bytes)", file.name, file.bytes.len());
            }
            if view.similar_images().is_empty() {
                let _ = writeln!(out, "no similar styles yet");
            } else {
                let _ = writeln!(out, "similar styles:");
                list_images(&mut out, view.similar_images());
            }
        }
        Tab::History => {
            if view.history().is_empty() {
                let _ = writeln!(out, "no searches yet");
            }
            for entry in view.history() {
                let _ = writeln!(
                    out,
                    "{}  {} similar  ({})",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.similar_images.len(),
                    entry.id
                );
            }
        }
        Tab::ForYou => {
            if view.recommendations().is_empty() {
                let _ = writeln!(out, "no recommendations yet");
            } else {
                list_images(&mut out, view.recommendations());
            }
        }
    }

    out
}

fn list_images(out: &mut String, images: &[String]) {
    for (i, image) in images.iter().enumerate() {
        let approx_bytes = image.len() / 4 * 3;
        let _ = writeln!(out, "  #{:<2} ~{} bytes", i + 1, approx_bytes);
    }
}

/// Decode base64 images into `dir` as `<prefix>-<n>.jpg`.
pub fn write_images(dir: &Path, prefix: &str, images: &[String]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let bytes = STANDARD
                .decode(image.trim())
                .with_context(|| format!("image #{} is not valid base64", i + 1))?;
            let path = dir.join(format!("{}-{}.jpg", prefix, i + 1));
            std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
            Ok(path)
        })
        .collect()
}
