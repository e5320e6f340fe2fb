//! Playback transitions
//!
//! Every action is rejected up front unless the session is `Ready`, then
//! takes the transport lock, issues the engine call(s) and only then commits
//! the new state. A failed engine call leaves index and play state exactly as
//! they were. When a multi-call action fails halfway the engine is moved back;
//! if that fails too, navigation falls back to absolute skips until the
//! engine is known to match the session again.

use std::sync::atomic::Ordering;

use tokio::sync::MutexGuard;

use crate::error::{Result, SessionError};
use crate::model::SessionState;

use super::SessionCoordinator;

/// Ready-state fields an action works from
#[derive(Clone, Copy, Debug)]
struct Position {
    index: usize,
    playing: bool,
    len: usize,
}

impl SessionCoordinator {
    async fn ready_position(&self) -> Result<Position> {
        let session = self.session.lock().await;
        match session.state {
            SessionState::Ready { index, playing } => Ok(Position {
                index,
                playing,
                len: session.track_count(),
            }),
            SessionState::Uninitialized | SessionState::Loading => Err(SessionError::NotReady),
            SessionState::Empty => Err(SessionError::EmptyCatalog),
            SessionState::Closed => Err(SessionError::Closed),
        }
    }

    /// Gate an action on `Ready` without queueing behind a pending
    /// initialization, then wait for the transport lock.
    async fn begin_transport(&self) -> Result<(MutexGuard<'_, ()>, Position)> {
        self.ready_position().await?;
        let guard = self.transport.lock().await;
        let position = self.ready_position().await?;
        Ok((guard, position))
    }

    /// `Ready(paused) -> Ready(playing)`. No engine call when already playing.
    pub async fn play(&self) -> Result<()> {
        let (_transport, _) = self.begin_transport().await?;
        self.play_locked().await
    }

    /// `Ready(playing) -> Ready(paused)`. No engine call when already paused.
    pub async fn pause(&self) -> Result<()> {
        let (_transport, _) = self.begin_transport().await?;
        self.pause_locked().await
    }

    /// Play/pause button: pause when playing, play otherwise
    pub async fn toggle(&self) -> Result<()> {
        let (_transport, position) = self.begin_transport().await?;
        tracing::debug!(is_playing = position.playing, "Toggling playback");
        if position.playing {
            self.pause_locked().await
        } else {
            self.play_locked().await
        }
    }

    async fn play_locked(&self) -> Result<()> {
        let position = self.ready_position().await?;
        if position.playing {
            tracing::debug!("Already playing");
            return Ok(());
        }

        if let Err(e) = self.engine.play().await {
            return Err(self.record_failure("play", e).await);
        }

        self.commit(SessionState::Ready { index: position.index, playing: true }).await;
        tracing::info!(index = position.index, "Playback resumed");
        Ok(())
    }

    async fn pause_locked(&self) -> Result<()> {
        let position = self.ready_position().await?;
        if !position.playing {
            tracing::debug!("Already paused");
            return Ok(());
        }

        if let Err(e) = self.engine.pause().await {
            return Err(self.record_failure("pause", e).await);
        }

        self.commit(SessionState::Ready { index: position.index, playing: false }).await;
        tracing::info!(index = position.index, "Playback paused");
        Ok(())
    }

    /// Direct selection from the track list. Always ends up playing.
    pub async fn select_track(&self, index: usize) -> Result<()> {
        let (_transport, position) = self.begin_transport().await?;
        if index >= position.len {
            let err = SessionError::IndexOutOfRange { index, len: position.len };
            return Err(self.record_failure("select_track", err).await);
        }
        tracing::debug!(from = position.index, to = index, "Selecting track");

        if let Err(e) = self.engine.skip_to_index(index).await {
            return Err(self.record_failure("select_track", e).await);
        }
        if let Err(e) = self.engine.play().await {
            self.restore_engine_index(position.index).await;
            return Err(self.record_failure("select_track", e).await);
        }

        self.engine_desynced.store(false, Ordering::Release);
        self.commit(SessionState::Ready { index, playing: true }).await;
        tracing::info!(index, "Track selected");
        Ok(())
    }

    /// Move the engine back to the committed track after a half-applied action
    async fn restore_engine_index(&self, index: usize) {
        if let Err(e) = self.engine.skip_to_index(index).await {
            tracing::warn!(index, error = %e, "Engine left off the committed track");
            self.engine_desynced.store(true, Ordering::Release);
        }
    }

    /// Relative skips are only trusted while the engine is known to sit on
    /// the committed track.
    fn engine_in_step(&self) -> bool {
        !self.engine_desynced.load(Ordering::Acquire)
    }

    /// Advance one track, wrapping from the last track to the first.
    pub async fn next(&self) -> Result<()> {
        let (_transport, position) = self.begin_transport().await?;

        let (target, result) = if position.index + 1 < position.len && self.engine_in_step() {
            (position.index + 1, self.engine.skip_to_next().await)
        } else {
            let target = (position.index + 1) % position.len;
            (target, self.engine.skip_to_index(target).await)
        };
        if let Err(e) = result {
            return Err(self.record_failure("next", e).await);
        }

        self.engine_desynced.store(false, Ordering::Release);
        self.commit(SessionState::Ready { index: target, playing: position.playing }).await;
        tracing::info!(from = position.index, to = target, "Skipped to next track");
        Ok(())
    }

    /// Go back one track, wrapping from the first track to the last.
    pub async fn previous(&self) -> Result<()> {
        let (_transport, position) = self.begin_transport().await?;

        let (target, result) = if position.index > 0 && self.engine_in_step() {
            (position.index - 1, self.engine.skip_to_previous().await)
        } else {
            let target = position.index.checked_sub(1).unwrap_or(position.len - 1);
            (target, self.engine.skip_to_index(target).await)
        };
        if let Err(e) = result {
            return Err(self.record_failure("previous", e).await);
        }

        self.engine_desynced.store(false, Ordering::Release);
        self.commit(SessionState::Ready { index: target, playing: position.playing }).await;
        tracing::info!(from = position.index, to = target, "Skipped to previous track");
        Ok(())
    }
}
