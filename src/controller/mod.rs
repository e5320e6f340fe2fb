//! Controller module - session state machine and event handling
//!
//! - `lifecycle`: catalog bootstrap, engine initialization, teardown
//! - `playback`: play / pause / select / next / previous transitions
//! - `progress_events`: engine progress feed listener
//! - `input`: console commands mapped onto session actions

mod lifecycle;
mod playback;
mod progress_events;
mod input;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::engine::{EngineAdapter, PlaybackEngine};
use crate::error::SessionError;
use crate::model::{PlaybackSession, SessionState};

pub use input::{Command, CommandOutcome};

/// Owns the session state and keeps it consistent with the playback engine.
///
/// Cloning is cheap; every clone drives the same session.
#[derive(Clone)]
pub struct SessionCoordinator {
    pub(crate) session: Arc<Mutex<PlaybackSession>>,
    pub(crate) engine: Arc<EngineAdapter>,
    /// Held for the whole duration of an engine transport call, so calls
    /// from concurrent actions queue up instead of interleaving.
    transport: Arc<Mutex<()>>,
    /// Set when the engine may sit on a different track than the session
    /// shows; navigation then skips by absolute index until it succeeds.
    engine_desynced: Arc<AtomicBool>,
    updates: Arc<watch::Sender<PlaybackSession>>,
    progress_listener: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionCoordinator {
    pub fn new(engine: Arc<dyn PlaybackEngine>) -> Self {
        let (updates, _) = watch::channel(PlaybackSession::default());
        Self {
            session: Arc::new(Mutex::new(PlaybackSession::default())),
            engine: Arc::new(EngineAdapter::new(engine)),
            transport: Arc::new(Mutex::new(())),
            engine_desynced: Arc::new(AtomicBool::new(false)),
            updates: Arc::new(updates),
            progress_listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Receive every published session change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSession> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> PlaybackSession {
        self.session.lock().await.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state
    }

    pub(crate) fn publish(&self, session: &PlaybackSession) {
        self.updates.send_replace(session.clone());
    }

    /// Commit a transition and clear any stale error
    pub(crate) async fn commit(&self, state: SessionState) {
        let mut session = self.session.lock().await;
        let previous = session.state;
        session.state = state;
        session.last_error = None;
        tracing::debug!(from = previous.name(), to = state.name(), "Session transition");
        self.publish(&session);
    }

    /// Record a failure for the UI without touching the session state
    pub(crate) async fn record_failure(&self, action: &'static str, error: SessionError) -> SessionError {
        tracing::error!(action, error = %error, "Session action failed");
        let mut session = self.session.lock().await;
        session.last_error = Some(Self::format_error(&error));
        self.publish(&session);
        error
    }

    pub fn format_error(error: &SessionError) -> String {
        match error {
            SessionError::NotReady => "Still loading songs, please wait.".to_string(),
            SessionError::EmptyCatalog => "No songs available.".to_string(),
            SessionError::NotInitialized => "Player is not ready yet.".to_string(),
            SessionError::Closed => "Player has been closed.".to_string(),
            SessionError::IndexOutOfRange { index, len } => {
                format!("Song {} does not exist ({} songs loaded).", index + 1, len)
            }
            SessionError::Catalog(e) => format!("Could not load songs: {}", e),
            other => format!("Error: {}", other),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use super::SessionCoordinator;
    use crate::engine::{PlaybackEngine, SimulatedEngine};
    use crate::model::{Catalog, Track};

    pub fn tracks(n: u64) -> Vec<Track> {
        (0..n)
            .map(|id| Track {
                id,
                url: format!("http://songs/{id}.mp3"),
                title: format!("Song {id}"),
                artist: format!("Artist {id}"),
                artwork: Some(format!("http://art/{id}.jpg")),
                duration: Duration::from_secs(200 + id),
            })
            .collect()
    }

    /// Coordinator already in `Ready(paused)` at index 0. The engine's push
    /// feed is detached so tests control progress by hand.
    pub async fn ready_session(n: u64) -> (SessionCoordinator, Arc<SimulatedEngine>) {
        let engine = Arc::new(SimulatedEngine::new());
        drop(engine.take_progress_feed().await);
        let coordinator = SessionCoordinator::new(engine.clone());
        coordinator
            .catalog_loaded(Catalog::new(tracks(n)))
            .await
            .unwrap();
        (coordinator, engine)
    }
}
