pub mod gemini;
pub mod spotify;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use reqwest::blocking::Response;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::MoodError;
use crate::models::MoodAnalysis;

/// Turns a free-text mood description into a themed playlist.
/// Gemini (generative) and Spotify (catalog search) both sit behind this trait.
#[cfg_attr(test, mockall::automock)]
pub trait MoodSource: Send + Sync {
    /// Display name of the upstream service.
    fn name(&self) -> &'static str;
    /// Issues one request for `query`. Never retries.
    fn fetch_mood_result(&self, query: &str) -> Result<MoodAnalysis, MoodError>;
}

/// Which `MoodSource` to use. Picked once per run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Generative model invents a playlist for the mood
    #[default]
    Gemini,
    /// Keyword search against the Spotify catalog
    Spotify,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Gemini => f.write_str("gemini"),
            Strategy::Spotify => f.write_str("spotify"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Strategy::Gemini),
            "spotify" => Ok(Strategy::Spotify),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// Builds the client for `strategy`. Credentials are checked at call time, not here.
pub fn build_source(config: &Config, strategy: Strategy) -> Arc<dyn MoodSource> {
    match strategy {
        Strategy::Gemini => Arc::new(gemini::GeminiClient::new(&config.gemini)),
        Strategy::Spotify => Arc::new(spotify::SpotifyClient::new(&config.spotify)),
    }
}

/// Maps non-success responses onto the error taxonomy.
/// `auth_statuses` lists the codes that mean the credential was rejected.
fn check_status(
    service: &str,
    resp: Response,
    auth_statuses: &[StatusCode],
) -> Result<Response, MoodError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    tracing::warn!(service, status = status.as_u16(), "upstream returned an error status");

    if auth_statuses.contains(&status) {
        return Err(MoodError::Auth(service.to_string()));
    }

    let reason = status.canonical_reason().unwrap_or("Unknown status");
    Err(MoodError::Upstream(format!("{} API error: {}", service, reason)))
}

fn parse_body<T: serde::de::DeserializeOwned>(service: &str, body: &str) -> Result<T, MoodError> {
    serde_json::from_str(body)
        .map_err(|e| MoodError::Parse(format!("{} response could not be parsed: {}", service, e)))
}
