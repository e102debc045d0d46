use std::sync::Mutex;

use base64::Engine;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::SpotifyConfig;
use crate::core::normalizer::{self, format_duration_ms, RawMoodAnalysis, RawPlaylist, RawTrack};
use crate::core::themes;
use crate::error::MoodError;
use crate::models::MoodAnalysis;
use crate::sources::{check_status, parse_body, MoodSource};

const SERVICE: &str = "Spotify";
pub const SEARCH_LIMIT: u32 = 15;
pub const DISCOVERY_PLAYLIST_ID: &str = "spotify-discovery";

/// Catalog-search strategy: sends the query verbatim to the Spotify search API
/// and brands the results with a theme picked from the query text.
pub struct SpotifyClient {
    client: reqwest::blocking::Client,
    config: SpotifyConfig,
    /// Token obtained through the client-credentials grant. Reused until the
    /// search endpoint rejects it.
    exchanged_token: Mutex<Option<String>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Option<TracksResult>,
}

#[derive(Deserialize)]
struct TracksResult {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Deserialize)]
struct SpotifyTrack {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: Option<SpotifyAlbum>,
    #[serde(default)]
    duration_ms: u64,
}

#[derive(Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Deserialize)]
struct SpotifyAlbum {
    name: String,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Deserialize)]
struct SpotifyImage {
    url: String,
}

impl SpotifyClient {
    pub fn new(config: &SpotifyConfig) -> Self {
        Self::with_http_client(config, reqwest::blocking::Client::new())
    }

    pub fn with_http_client(config: &SpotifyConfig, client: reqwest::blocking::Client) -> Self {
        Self {
            client,
            config: config.clone(),
            exchanged_token: Mutex::new(None),
        }
    }

    /// Bearer token for the search call: the configured one, or one exchanged
    /// from client credentials on first use.
    fn bearer_token(&self) -> Result<String, MoodError> {
        if let Some(token) = self.config.access_token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }

        if !self.config.has_client_credentials() {
            return Err(MoodError::Configuration(
                "Spotify access token is missing (set SPOTIFY_ACCESS_TOKEN or client credentials)"
                    .to_string(),
            ));
        }

        let mut cached = self
            .exchanged_token
            .lock()
            .map_err(|_| MoodError::Upstream("Spotify token cache is poisoned".to_string()))?;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = self.authenticate()?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Drops an exchanged token so the next call mints a fresh one.
    fn forget_exchanged_token(&self) {
        if self.config.has_access_token() {
            return;
        }
        if let Ok(mut cached) = self.exchanged_token.lock() {
            if cached.take().is_some() {
                tracing::debug!("Spotify rejected the exchanged token, clearing it");
            }
        }
    }

    fn authenticate(&self) -> Result<String, MoodError> {
        let client_id = self.config.client_id.as_deref().unwrap_or_default();
        let client_secret = self.config.client_secret.as_deref().unwrap_or_default();
        let credentials = format!("{}:{}", client_id, client_secret);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);

        tracing::debug!("exchanging Spotify client credentials for a token");
        let url = format!(
            "{}/api/token",
            self.config.accounts_base.trim_end_matches('/')
        );
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Basic {}", encoded))
            .form(&[("grant_type", "client_credentials")])
            .send()?;

        // The accounts service answers bad client credentials with 400.
        let resp = check_status(
            SERVICE,
            resp,
            &[StatusCode::BAD_REQUEST, StatusCode::UNAUTHORIZED],
        )?;
        let body = resp.text()?;
        let token: TokenResponse = parse_body(SERVICE, &body)?;
        Ok(token.access_token)
    }

    fn search(&self, token: &str, query: &str) -> Result<Vec<SpotifyTrack>, MoodError> {
        let url = format!("{}/search", self.config.api_base.trim_end_matches('/'));
        let limit = SEARCH_LIMIT.to_string();

        tracing::info!(query, "searching Spotify");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()?;

        let resp = check_status(SERVICE, resp, &[StatusCode::UNAUTHORIZED])?;
        let body = resp.text()?;
        let parsed: SearchResponse = parse_body(SERVICE, &body)?;

        let items = parsed.tracks.map(|t| t.items).unwrap_or_default();
        tracing::debug!(count = items.len(), "Spotify search returned");
        Ok(items)
    }

    fn convert_track(track: SpotifyTrack) -> RawTrack {
        let artist = track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let (album, cover_url) = match track.album {
            Some(album) => (
                Some(album.name),
                album.images.into_iter().next().map(|img| img.url),
            ),
            None => (None, None),
        };

        RawTrack {
            id: track.id,
            title: Some(track.name),
            artist: Some(artist),
            album,
            duration: Some(format_duration_ms(track.duration_ms)),
            cover_url,
        }
    }

    fn build_analysis(query: &str, items: Vec<SpotifyTrack>) -> MoodAnalysis {
        let theme = themes::theme_for_query(query);
        tracing::debug!(category = theme.category, "theme chosen from query");

        let raw = RawMoodAnalysis {
            mood: Some(theme.category.to_string()),
            emoji: Some(theme.emoji.to_string()),
            description: Some(format!(
                "Synced with Spotify to find tracks for: \"{}\". Here is your mood's real-world soundtrack.",
                query
            )),
            color: Some(theme.color.to_string()),
            playlists: vec![RawPlaylist {
                id: Some(DISCOVERY_PLAYLIST_ID.to_string()),
                name: Some(format!("{} Vibe", theme.category)),
                description: Some(format!("Search results for {}", query)),
                tracks: items.into_iter().map(Self::convert_track).collect(),
            }],
        };

        normalizer::normalize(raw)
    }
}

impl MoodSource for SpotifyClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    fn fetch_mood_result(&self, query: &str) -> Result<MoodAnalysis, MoodError> {
        let token = self.bearer_token()?;
        let items = match self.search(&token, query) {
            Err(MoodError::Auth(service)) => {
                self.forget_exchanged_token();
                return Err(MoodError::Auth(service));
            }
            other => other?,
        };

        if items.is_empty() {
            return Err(MoodError::NoResults);
        }

        Ok(Self::build_analysis(query, items))
    }
}
