use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Always `minutes:seconds`, e.g. `3:07`.
    pub duration: String,
    pub cover_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tracks: Vec<Track>,
}

/// The result of one successful request: a themed set of playlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodAnalysis {
    pub mood: String,
    pub emoji: String,
    pub description: String,
    pub color: String,
    pub playlists: Vec<Playlist>,
}

impl MoodAnalysis {
    /// Every track across all playlists, in display order.
    pub fn all_tracks(&self) -> impl Iterator<Item = &Track> {
        self.playlists.iter().flat_map(|p| &p.tracks)
    }

    pub fn track_count(&self) -> usize {
        self.playlists.iter().map(|p| p.tracks.len()).sum()
    }

    pub fn headline(&self) -> String {
        format!("{} {} Vibes", self.emoji, self.mood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist: "Band".to_string(),
            album: "Album".to_string(),
            duration: "3:00".to_string(),
            cover_url: format!("https://example.com/{}.jpg", id),
        }
    }

    #[test]
    fn test_all_tracks_spans_every_playlist() {
        let analysis = MoodAnalysis {
            mood: "Calm".to_string(),
            emoji: "🍃".to_string(),
            description: String::new(),
            color: "#34d399".to_string(),
            playlists: vec![
                Playlist {
                    id: "a".to_string(),
                    name: "Morning".to_string(),
                    description: String::new(),
                    tracks: vec![track("1"), track("2")],
                },
                Playlist {
                    id: "b".to_string(),
                    name: "Evening".to_string(),
                    description: String::new(),
                    tracks: vec![track("3")],
                },
            ],
        };

        let ids: Vec<&str> = analysis.all_tracks().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(analysis.track_count(), 3);
        assert_eq!(analysis.headline(), "🍃 Calm Vibes");
    }
}
