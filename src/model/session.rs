//! Playback session state

use std::sync::Arc;
use std::time::Duration;

use super::track::{Catalog, Track};

/// Lifecycle of the listener session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Catalog not loaded yet (or the last load failed)
    #[default]
    Uninitialized,
    /// Catalog loaded, engine queue being set up
    Loading,
    Ready { index: usize, playing: bool },
    /// Catalog loaded with zero tracks. Terminal.
    Empty,
    /// Torn down. Terminal.
    Closed,
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match self {
            SessionState::Ready { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, SessionState::Ready { playing: true, .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Loading => "loading",
            SessionState::Ready { playing: true, .. } => "playing",
            SessionState::Ready { playing: false, .. } => "paused",
            SessionState::Empty => "empty",
            SessionState::Closed => "closed",
        }
    }
}

/// One progress reading from the engine.
///
/// Samples replace each other; they are never accumulated. `buffered` may lag
/// behind `position` right after a seek.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressSample {
    pub position: Duration,
    pub buffered: Duration,
    pub duration: Duration,
}

impl ProgressSample {
    pub fn new(position: Duration, buffered: Duration, duration: Duration) -> Self {
        Self {
            position,
            buffered,
            duration,
        }
    }

    /// Buffered horizon has not reached the end of the track
    pub fn is_still_buffering(&self) -> bool {
        self.buffered < self.duration
    }
}

/// Everything the UI boundary may read about the session.
///
/// Published as a whole on every change; `catalog` is `None` until loaded.
#[derive(Clone, Debug, Default)]
pub struct PlaybackSession {
    pub catalog: Option<Arc<Catalog>>,
    pub state: SessionState,
    pub progress: ProgressSample,
    pub last_error: Option<String>,
}

impl PlaybackSession {
    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Never stored separately, always follows `is_playing`
    pub fn rotation_active(&self) -> bool {
        self.is_playing()
    }

    pub fn current_track(&self) -> Option<&Track> {
        let index = self.current_index()?;
        self.catalog.as_ref()?.get(index)
    }

    pub fn track_count(&self) -> usize {
        self.catalog.as_ref().map(|c| c.len()).unwrap_or(0)
    }
}
