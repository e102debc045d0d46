use anyhow::{Context, Result};

use crate::models::Track;

/// Downloads the cover image bytes of a track.
pub fn fetch_cover(client: &reqwest::blocking::Client, track: &Track) -> Result<Vec<u8>> {
    if track.cover_url.is_empty() {
        anyhow::bail!("track {} has no cover URL", track.id);
    }

    let data = client
        .get(&track.cover_url)
        .send()
        .context("cover download failed")?
        .error_for_status()
        .context("cover request was rejected")?
        .bytes()
        .context("cover body could not be read")?
        .to_vec();

    tracing::debug!(url = %track.cover_url, bytes = data.len(), "cover downloaded");
    Ok(data)
}
