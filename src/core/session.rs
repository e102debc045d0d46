use crate::error::{MoodError, SubmitError};
use crate::models::MoodAnalysis;
use crate::sources::MoodSource;

/// Which view the front-end should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    Idle,
    Analyzing,
    Ready,
    Error,
}

/// Identifies one submitted request. Completions carrying any other ticket
/// than the in-flight one are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
enum State {
    Idle,
    Analyzing { ticket: Ticket, query: String },
    Ready(MoodAnalysis),
    Error(String),
}

/// Owns the single current application state.
///
/// Payloads live inside the state they belong to, so leaving Ready or Error
/// discards the analysis or message with it.
#[derive(Debug)]
pub struct MoodSession {
    state: State,
    next_ticket: u64,
}

impl Default for MoodSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MoodSession {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            next_ticket: 0,
        }
    }

    pub fn status(&self) -> AppStatus {
        match self.state {
            State::Idle => AppStatus::Idle,
            State::Analyzing { .. } => AppStatus::Analyzing,
            State::Ready(_) => AppStatus::Ready,
            State::Error(_) => AppStatus::Error,
        }
    }

    pub fn analysis(&self) -> Option<&MoodAnalysis> {
        match &self.state {
            State::Ready(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            State::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// The text of the request in flight, if any.
    pub fn pending_query(&self) -> Option<&str> {
        match &self.state {
            State::Analyzing { query, .. } => Some(query),
            _ => None,
        }
    }

    /// Idle -> Analyzing. The returned ticket must be passed to `complete`.
    pub fn submit(&mut self, text: &str) -> Result<Ticket, SubmitError> {
        match self.state {
            State::Idle => {}
            State::Analyzing { .. } => return Err(SubmitError::Busy),
            State::Ready(_) | State::Error(_) => return Err(SubmitError::NotIdle),
        }

        let query = text.trim();
        if query.is_empty() {
            return Err(SubmitError::EmptyQuery);
        }

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        tracing::debug!(ticket = ticket.0, query, "Idle -> Analyzing");
        self.state = State::Analyzing {
            ticket,
            query: query.to_string(),
        };
        Ok(ticket)
    }

    /// Analyzing -> Ready | Error. Returns `false` when the ticket is stale
    /// and the result was ignored.
    pub fn complete(&mut self, ticket: Ticket, result: Result<MoodAnalysis, MoodError>) -> bool {
        let in_flight = match self.state {
            State::Analyzing { ticket: current, .. } => current == ticket,
            _ => false,
        };
        if !in_flight {
            tracing::debug!(ticket = ticket.0, "dropping stale response");
            return false;
        }

        let result = result.and_then(|analysis| {
            if analysis.playlists.is_empty() {
                Err(MoodError::NoResults)
            } else {
                Ok(analysis)
            }
        });

        self.state = match result {
            Ok(analysis) => {
                tracing::debug!(ticket = ticket.0, mood = %analysis.mood, "Analyzing -> Ready");
                State::Ready(analysis)
            }
            Err(e) => {
                tracing::warn!(ticket = ticket.0, error = %e, "Analyzing -> Error");
                State::Error(e.user_message())
            }
        };
        true
    }

    /// Error -> Idle. Returns `false` in any other state.
    pub fn acknowledge(&mut self) -> bool {
        if matches!(self.state, State::Error(_)) {
            self.state = State::Idle;
            true
        } else {
            false
        }
    }

    /// Any state -> Idle. A request still in flight becomes stale.
    pub fn reset(&mut self) {
        if let State::Analyzing { ticket, .. } = self.state {
            tracing::debug!(ticket = ticket.0, "abandoning in-flight request");
        }
        self.state = State::Idle;
    }
}

/// Runs one request to completion on the calling thread.
pub fn analyze(
    session: &mut MoodSession,
    source: &dyn MoodSource,
    text: &str,
) -> Result<AppStatus, SubmitError> {
    let ticket = session.submit(text)?;
    let query = session.pending_query().unwrap_or(text).to_string();
    let result = source.fetch_mood_result(&query);
    session.complete(ticket, result);
    Ok(session.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::is_valid_duration;
    use crate::models::{Playlist, Track};
    use crate::sources::MockMoodSource;

    fn sample_analysis() -> MoodAnalysis {
        MoodAnalysis {
            mood: "Energetic".to_string(),
            emoji: "🔥".to_string(),
            description: "Let's go".to_string(),
            color: "#f87171".to_string(),
            playlists: vec![Playlist {
                id: "spotify-discovery".to_string(),
                name: "Energetic Vibe".to_string(),
                description: String::new(),
                tracks: vec![Track {
                    id: "t1".to_string(),
                    title: "Stronger".to_string(),
                    artist: "Kanye West".to_string(),
                    album: "Graduation".to_string(),
                    duration: "5:12".to_string(),
                    cover_url: "https://i.scdn.co/image/big".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn test_submit_enters_analyzing_before_completion() {
        let mut session = MoodSession::new();
        assert_eq!(session.status(), AppStatus::Idle);

        let ticket = session.submit("  gym session  ").unwrap();
        assert_eq!(session.status(), AppStatus::Analyzing);
        assert_eq!(session.pending_query(), Some("gym session"));
        assert!(session.analysis().is_none());

        assert!(session.complete(ticket, Ok(sample_analysis())));
        assert_eq!(session.status(), AppStatus::Ready);
    }

    #[test]
    fn test_blank_submit_is_rejected() {
        let mut session = MoodSession::new();
        assert_eq!(session.submit("   \n\t"), Err(SubmitError::EmptyQuery));
        assert_eq!(session.status(), AppStatus::Idle);
    }

    #[test]
    fn test_second_submit_while_analyzing_is_busy() {
        let mut session = MoodSession::new();
        session.submit("happy").unwrap();
        assert_eq!(session.submit("sad"), Err(SubmitError::Busy));
        assert_eq!(session.pending_query(), Some("happy"));
    }

    #[test]
    fn test_ready_requires_reset_before_new_submit() {
        let mut session = MoodSession::new();
        let ticket = session.submit("happy").unwrap();
        session.complete(ticket, Ok(sample_analysis()));

        assert_eq!(session.submit("sad"), Err(SubmitError::NotIdle));
        assert!(!session.acknowledge());

        session.reset();
        assert_eq!(session.status(), AppStatus::Idle);
        assert!(session.analysis().is_none());
        assert!(session.submit("sad").is_ok());
    }

    #[test]
    fn test_failure_becomes_user_message() {
        let mut session = MoodSession::new();
        let ticket = session.submit("happy").unwrap();
        session.complete(ticket, Err(MoodError::Auth("Spotify".to_string())));

        assert_eq!(session.status(), AppStatus::Error);
        let msg = session.error_message().unwrap();
        assert!(msg.contains("credentials"));

        assert!(session.acknowledge());
        assert_eq!(session.status(), AppStatus::Idle);
        assert!(session.error_message().is_none());
    }

    #[test]
    fn test_empty_playlists_never_reach_ready() {
        let mut session = MoodSession::new();
        let ticket = session.submit("happy").unwrap();
        let mut empty = sample_analysis();
        empty.playlists.clear();

        session.complete(ticket, Ok(empty));
        assert_eq!(session.status(), AppStatus::Error);
        assert!(session.error_message().unwrap().contains("different keywords"));
    }

    #[test]
    fn test_stale_response_after_reset_is_ignored() {
        let mut session = MoodSession::new();
        let old = session.submit("happy").unwrap();
        session.reset();
        let new = session.submit("sad").unwrap();
        assert_ne!(old, new);

        assert!(!session.complete(old, Ok(sample_analysis())));
        assert_eq!(session.status(), AppStatus::Analyzing);
        assert_eq!(session.pending_query(), Some("sad"));

        assert!(session.complete(new, Err(MoodError::NoResults)));
        assert_eq!(session.status(), AppStatus::Error);
    }

    #[test]
    fn test_completion_in_idle_is_ignored() {
        let mut session = MoodSession::new();
        let ticket = session.submit("happy").unwrap();
        session.reset();
        assert!(!session.complete(ticket, Ok(sample_analysis())));
        assert_eq!(session.status(), AppStatus::Idle);
    }

    #[test]
    fn test_analyze_calls_source_once_with_trimmed_query() {
        let mut source = MockMoodSource::new();
        source
            .expect_fetch_mood_result()
            .withf(|q| q == "workout energy")
            .times(1)
            .returning(|_| Ok(sample_analysis()));

        let mut session = MoodSession::new();
        let status = analyze(&mut session, &source, " workout energy ").unwrap();

        assert_eq!(status, AppStatus::Ready);
        let analysis = session.analysis().unwrap();
        assert!(!analysis.playlists.is_empty());
        assert!(analysis
            .playlists
            .iter()
            .flat_map(|p| &p.tracks)
            .all(|t| is_valid_duration(&t.duration)));
    }

    #[test]
    fn test_analyze_maps_failure_to_error_state() {
        let mut source = MockMoodSource::new();
        source
            .expect_fetch_mood_result()
            .times(1)
            .returning(|_| Err(MoodError::Upstream("Spotify API error: Bad Gateway".to_string())));

        let mut session = MoodSession::new();
        let status = analyze(&mut session, &source, "happy").unwrap();
        assert_eq!(status, AppStatus::Error);
        assert!(session.error_message().unwrap().contains("try again"));
    }

    #[test]
    fn test_analyze_blank_input_never_calls_source() {
        let mut source = MockMoodSource::new();
        source.expect_fetch_mood_result().times(0);

        let mut session = MoodSession::new();
        assert_eq!(
            analyze(&mut session, &source, "  "),
            Err(SubmitError::EmptyQuery)
        );
    }
}
