use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::core::themes::{self, parse_hex_color};
use crate::models::{MoodAnalysis, Playlist, Track};

pub const PLACEHOLDER_ALBUM: &str = "Featured Album";
pub const PLACEHOLDER_DURATION: &str = "3:45";
pub const FALLBACK_MOOD: &str = "Found";

/// Loosely typed analysis as it comes off the wire. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMoodAnalysis {
    pub mood: Option<String>,
    pub emoji: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub playlists: Vec<RawPlaylist>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPlaylist {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub tracks: Vec<RawTrack>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTrack {
    pub id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<String>,
    pub cover_url: Option<String>,
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+:\d{2}$").expect("valid duration regex"))
}

pub fn is_valid_duration(s: &str) -> bool {
    duration_pattern().is_match(s)
}

/// Formats milliseconds as `m:ss`, rounding to the nearest second.
pub fn format_duration_ms(ms: u64) -> String {
    let total_secs = (ms + 500) / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Stable placeholder cover for a title/artist pair.
pub fn placeholder_cover_url(title: &str, artist: &str) -> String {
    let seed = format!("{}{}", title, artist);
    format!(
        "https://picsum.photos/seed/{}/200/200",
        urlencoding::encode(&seed)
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Fills defaults on one track. `index` is its position within the playlist.
pub fn normalize_track(raw: RawTrack, index: usize) -> Track {
    let title = raw.title.unwrap_or_default();
    let artist = raw.artist.unwrap_or_default();

    let duration = non_blank(raw.duration)
        .filter(|d| is_valid_duration(d))
        .unwrap_or_else(|| PLACEHOLDER_DURATION.to_string());

    let cover_url =
        non_blank(raw.cover_url).unwrap_or_else(|| placeholder_cover_url(&title, &artist));

    Track {
        id: non_blank(raw.id).unwrap_or_else(|| format!("track-{}", index)),
        album: non_blank(raw.album).unwrap_or_else(|| PLACEHOLDER_ALBUM.to_string()),
        title,
        artist,
        duration,
        cover_url,
    }
}

/// Normalizes a playlist's tracks, keeping ids unique within it. A repeated
/// id falls back to `track-<index>`, suffixed if that is taken too.
fn normalize_tracks(raw: Vec<RawTrack>) -> Vec<Track> {
    let mut used = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, t)| {
            let mut track = normalize_track(t, i);
            if !used.insert(track.id.clone()) {
                let base = format!("track-{}", i);
                let mut id = base.clone();
                let mut n = 1;
                while used.contains(&id) {
                    id = format!("{}-{}", base, n);
                    n += 1;
                }
                used.insert(id.clone());
                track.id = id;
            }
            track
        })
        .collect()
}

/// Shapes an upstream response into a `MoodAnalysis`.
///
/// Nothing is rejected here: missing titles and artists pass through as empty
/// strings. Playlists left without tracks are dropped, so callers only need to
/// check `playlists.is_empty()` to detect an empty result.
pub fn normalize(raw: RawMoodAnalysis) -> MoodAnalysis {
    let mood = non_blank(raw.mood).unwrap_or_else(|| FALLBACK_MOOD.to_string());
    let theme = themes::theme_for_mood(&mood);

    let color = non_blank(raw.color)
        .filter(|c| parse_hex_color(c).is_some())
        .unwrap_or_else(|| theme.color.to_string());
    let emoji = non_blank(raw.emoji).unwrap_or_else(|| theme.emoji.to_string());

    let playlists = raw
        .playlists
        .into_iter()
        .enumerate()
        .filter(|(_, p)| !p.tracks.is_empty())
        .map(|(p_idx, p)| Playlist {
            id: non_blank(p.id).unwrap_or_else(|| format!("playlist-{}", p_idx)),
            name: non_blank(p.name).unwrap_or_else(|| format!("{} Mix", mood)),
            description: p.description.unwrap_or_default(),
            tracks: normalize_tracks(p.tracks),
        })
        .collect();

    MoodAnalysis {
        mood,
        emoji,
        description: raw.description.unwrap_or_default(),
        color,
        playlists,
    }
}
