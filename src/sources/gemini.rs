use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::GeminiConfig;
use crate::core::normalizer::{self, RawMoodAnalysis};
use crate::core::themes::MoodCategory;
use crate::error::MoodError;
use crate::models::MoodAnalysis;
use crate::sources::{check_status, parse_body, MoodSource};

const SERVICE: &str = "Gemini";
const PLAYLIST_SIZE: usize = 10;

/// Generative strategy: asks the model for a complete analysis as JSON.
///
/// The tracks come from the model alone and are not checked against any
/// catalog. Cover URLs from the model are dropped and replaced by the
/// normalizer's placeholders.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    config: GeminiConfig,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the following emotional input: \"{text}\".\n\n\
         Categorize the mood into exactly one of these types: {categories}.\n\n\
         Then curate a \"Moodify\" playlist of {size} actual, real-world songs \
         (title and artist) that match this mood.\n\
         Provide a hex color code that represents the mood (for example #1DB954 \
         for Joyful or #4A90E2 for Calm) and a single emoji.",
        text = text,
        categories = MoodCategory::joined(),
        size = PLAYLIST_SIZE,
    )
}

/// Schema the model's JSON answer must follow.
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "mood": { "type": "STRING" },
            "emoji": { "type": "STRING" },
            "description": { "type": "STRING" },
            "color": { "type": "STRING" },
            "playlists": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "name": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "tracks": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "id": { "type": "STRING" },
                                    "title": { "type": "STRING" },
                                    "artist": { "type": "STRING" },
                                    "album": { "type": "STRING" },
                                    "duration": { "type": "STRING" },
                                    "coverUrl": { "type": "STRING" }
                                },
                                "required": ["id", "title", "artist"]
                            }
                        }
                    }
                }
            }
        },
        "required": ["mood", "emoji", "description", "color", "playlists"]
    })
}

fn request_body(text: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": build_prompt(text) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self::with_http_client(config, reqwest::blocking::Client::new())
    }

    pub fn with_http_client(config: &GeminiConfig, client: reqwest::blocking::Client) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    fn generate(&self, api_key: &str, text: &str) -> Result<String, MoodError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );

        tracing::info!(model = %self.config.model, "requesting mood analysis");
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body(text))
            .send()?;

        // An unknown key comes back as 400 with a reason code instead of 401.
        if resp.status() == StatusCode::BAD_REQUEST {
            let body = resp.text()?;
            if body.contains("API_KEY_INVALID") {
                return Err(MoodError::Auth(SERVICE.to_string()));
            }
            return Err(MoodError::Upstream(format!(
                "{} API error: Bad Request",
                SERVICE
            )));
        }

        let resp = check_status(
            SERVICE,
            resp,
            &[StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN],
        )?;
        let body = resp.text()?;
        let parsed: GenerateResponse = parse_body(SERVICE, &body)?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(MoodError::Parse(format!("{} returned no content", SERVICE)));
        }
        Ok(text)
    }
}

impl MoodSource for GeminiClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    fn fetch_mood_result(&self, query: &str) -> Result<MoodAnalysis, MoodError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                MoodError::Configuration("Gemini API key is missing (set GEMINI_API_KEY)".to_string())
            })?;

        let text = self.generate(api_key, query)?;
        let mut raw: RawMoodAnalysis = parse_body(SERVICE, &text)?;

        for playlist in &mut raw.playlists {
            for track in &mut playlist.tracks {
                track.cover_url = None;
            }
        }

        let analysis = normalizer::normalize(raw);
        if analysis.playlists.is_empty() {
            return Err(MoodError::NoResults);
        }

        tracing::debug!(
            mood = %analysis.mood,
            tracks = analysis.track_count(),
            "mood analysis received"
        );
        Ok(analysis)
    }
}
