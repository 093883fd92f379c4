//! Frontier persistence: checkpoint files and seed lists

use crate::frontier::{Frontier, FrontierSnapshot};
use crate::url::is_http_url;
use crate::CrawlError;
use rand::seq::IndexedRandom;
use std::path::{Path, PathBuf};

/// Writes the frontier to `path` as JSON
///
/// The file is written next to its destination and renamed into place, so a
/// crash never leaves a half-written checkpoint.
pub fn save_checkpoint(frontier: &Frontier, path: &Path) -> Result<(), CrawlError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let snapshot = frontier.snapshot();
    let json = serde_json::to_vec_pretty(&snapshot)?;

    let tmp = temp_path(path);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;

    tracing::info!(
        "Saved checkpoint with {} pending URLs to {}",
        frontier.len(),
        path.display()
    );
    Ok(())
}

/// Loads a frontier from a checkpoint file
///
/// # Returns
///
/// * `Ok(Some(Frontier))` - The checkpoint was loaded
/// * `Ok(None)` - No checkpoint exists at `path`
/// * `Err(CrawlError)` - The file exists but could not be read or parsed
pub fn load_checkpoint(path: &Path) -> Result<Option<Frontier>, CrawlError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read(path)?;
    let snapshot: FrontierSnapshot = serde_json::from_slice(&content)?;

    Ok(Some(Frontier::from_snapshot(snapshot)))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads a seed list and returns one URL at random
///
/// Blank lines and lines starting with `#` are skipped, as are lines that
/// are not absolute http(s) URLs.
pub fn pick_seed(path: &Path) -> Result<String, CrawlError> {
    let content = std::fs::read_to_string(path)?;
    let seeds = parse_seeds(&content);

    seeds
        .choose(&mut rand::rng())
        .cloned()
        .ok_or_else(|| CrawlError::NoSeed(path.display().to_string()))
}

fn parse_seeds(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| {
            let valid = is_http_url(line) && url::Url::parse(line).is_ok();
            if !valid {
                tracing::warn!("Skipping invalid seed URL: {}", line);
            }
            valid
        })
        .map(str::to_string)
        .collect()
}
