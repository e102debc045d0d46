use std::path::Path;

use anyhow::{Context, Result};

use crate::models::MoodAnalysis;

pub fn to_json(analysis: &MoodAnalysis) -> Result<String> {
    serde_json::to_string_pretty(analysis).context("failed to serialize playlist")
}

/// Writes the analysis as pretty JSON, creating parent directories as needed.
pub fn save_analysis(path: &Path, analysis: &MoodAnalysis) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
    }
    let content = to_json(analysis)?;
    std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))?;
    tracing::info!(path = %path.display(), "playlist exported");
    Ok(())
}

/// Suggested file name such as `calm-vibes.json`.
pub fn default_file_name(analysis: &MoodAnalysis) -> String {
    let slug: String = analysis
        .mood
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "moodify-vibes.json".to_string()
    } else {
        format!("{}-vibes.json", slug)
    }
}
