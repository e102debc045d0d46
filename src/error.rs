use thiserror::Error;

/// Failures of a single mood request.
#[derive(Debug, Error)]
pub enum MoodError {
    /// A required credential is not configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The upstream service rejected the credential.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// Any other non-success response.
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("no tracks found")]
    NoResults,

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MoodError {
    /// Plain text shown on the error view.
    pub fn user_message(&self) -> String {
        match self {
            MoodError::Configuration(detail) => format!(
                "{}. Run `moodify config` or set the matching environment variable.",
                detail
            ),
            MoodError::Auth(service) => format!(
                "{} rejected your credentials (unauthorized). Update your API key or token and try again.",
                service
            ),
            MoodError::NoResults => {
                "No tracks found for that vibe. Try different keywords!".to_string()
            }
            MoodError::Upstream(_) | MoodError::Parse(_) | MoodError::Network(_) => {
                "Something went wrong while analyzing your mood. Please try again.".to_string()
            }
        }
    }
}

/// Reasons the session refuses a new submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("the mood description is empty")]
    EmptyQuery,

    #[error("a request is already in flight")]
    Busy,

    #[error("the session must be reset before a new request")]
    NotIdle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_message_mentions_credentials() {
        let msg = MoodError::Auth("Spotify".to_string()).user_message();
        assert!(msg.contains("Spotify"));
        assert!(msg.contains("credentials"));
    }

    #[test]
    fn test_no_results_suggests_rephrasing() {
        let msg = MoodError::NoResults.user_message();
        assert!(msg.contains("different keywords"));
    }

    #[test]
    fn test_parse_error_is_generic() {
        let msg = MoodError::Parse("missing field `mood`".to_string()).user_message();
        assert!(!msg.contains("mood`"));
        assert!(msg.contains("try again"));
    }
}
