//! View module - what the listener screen shows, projected from session state
//!
//! - `feedback`: artwork rotation and the buffering notice
//! - `utils`: time and text formatting
//!
//! Layout and drawing are left to whatever UI consumes these values.

mod feedback;
mod utils;

use std::time::Duration;

use crate::model::{PlaybackSession, SessionState};

pub use feedback::{
    buffering_notice, Feedback, FeedbackDriver, RotationClock, RotationDescriptor, Toast,
    BUFFERING_MESSAGE,
};
pub use utils::{format_duration, truncate_string};

/// Icon on the play/pause button
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
}

/// One entry of the selectable track list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackRow {
    pub index: usize,
    pub title: String,
    pub artist: String,
    pub artwork: Option<String>,
    pub duration: String,
    pub is_current: bool,
}

/// Bottom control bar contents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub artwork: Option<String>,
    /// `elapsed/total`
    pub time: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListenerView {
    pub rows: Vec<TrackRow>,
    pub now_playing: Option<NowPlaying>,
    pub play_icon: PlayIcon,
    pub rotation: RotationDescriptor,
    pub buffering: bool,
    pub status: &'static str,
    pub error: Option<String>,
}

impl ListenerView {
    /// Nothing catalog-derived is shown until the catalog is loaded.
    pub fn project(session: &PlaybackSession, rotation_period: Duration) -> Self {
        let current = session.current_index();

        let rows = session
            .catalog
            .as_ref()
            .map(|catalog| {
                catalog
                    .iter()
                    .enumerate()
                    .map(|(index, track)| TrackRow {
                        index,
                        title: track.title.clone(),
                        artist: track.artist.clone(),
                        artwork: track.artwork.clone(),
                        duration: format_duration(track.duration),
                        is_current: current == Some(index),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let now_playing = session.current_track().map(|track| {
            // the engine reports zero until the stream header is read
            let total = if session.progress.duration.is_zero() {
                track.duration
            } else {
                session.progress.duration
            };
            NowPlaying {
                title: track.title.clone(),
                artist: track.artist.clone(),
                artwork: track.artwork.clone(),
                time: format!(
                    "{}/{}",
                    format_duration(session.progress.position),
                    format_duration(total)
                ),
            }
        });

        let status = match session.state {
            SessionState::Uninitialized if session.last_error.is_some() => "failed",
            SessionState::Uninitialized | SessionState::Loading => "loading",
            state => state.name(),
        };

        Self {
            rows,
            now_playing,
            play_icon: if session.is_playing() { PlayIcon::Pause } else { PlayIcon::Play },
            rotation: RotationDescriptor::for_session(session, rotation_period),
            buffering: buffering_notice(session.is_playing(), &session.progress),
            status,
            error: session.last_error.clone(),
        }
    }

    /// One-line summary of the control bar
    pub fn status_line(&self) -> String {
        let icon = match self.play_icon {
            PlayIcon::Play => "⏸",
            PlayIcon::Pause => "▶",
        };
        match &self.now_playing {
            Some(now) => format!(" {} {} | {}   {}", icon, now.title, now.artist, now.time),
            None => format!(" [{}]", self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ROTATION_PERIOD;
    use crate::model::{Catalog, ProgressSample, Track};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Track {
                id: 1,
                url: "http://songs/1.mp3".to_string(),
                title: "Tide".to_string(),
                artist: "First".to_string(),
                artwork: Some("http://art/1.jpg".to_string()),
                duration: Duration::from_secs(215),
            },
            Track {
                id: 2,
                url: "http://songs/2.mp3".to_string(),
                title: "Lanterns".to_string(),
                artist: "Solo".to_string(),
                artwork: None,
                duration: Duration::from_secs(183),
            },
        ])
    }

    #[test]
    fn nothing_shown_before_catalog_loads() {
        let view = ListenerView::project(&PlaybackSession::default(), ROTATION_PERIOD);
        assert!(view.rows.is_empty());
        assert!(view.now_playing.is_none());
        assert_eq!(view.play_icon, PlayIcon::Play);
        assert_eq!(view.status, "loading");
        assert_eq!(view.status_line(), " [loading]");
    }

    #[test]
    fn failed_load_is_reported() {
        let session = PlaybackSession {
            last_error: Some("Could not load songs".to_string()),
            ..Default::default()
        };
        let view = ListenerView::project(&session, ROTATION_PERIOD);
        assert_eq!(view.status, "failed");
        assert!(view.rows.is_empty());
        assert_eq!(view.error.as_deref(), Some("Could not load songs"));
    }

    #[test]
    fn projects_current_track_and_time() {
        let session = PlaybackSession {
            catalog: Some(catalog().into_shared()),
            state: SessionState::Ready { index: 1, playing: true },
            progress: ProgressSample::new(
                Duration::from_secs(65),
                Duration::from_secs(100),
                Duration::from_secs(183),
            ),
            last_error: None,
        };
        let view = ListenerView::project(&session, ROTATION_PERIOD);

        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].duration, "3:35");
        assert!(!view.rows[0].is_current);
        assert!(view.rows[1].is_current);

        let now = view.now_playing.as_ref().unwrap();
        assert_eq!(now.title, "Lanterns");
        assert_eq!(now.time, "1:05/3:03");
        assert_eq!(view.play_icon, PlayIcon::Pause);
        assert!(view.rotation.active);
        assert!(view.buffering);
        assert_eq!(view.status, "playing");
    }

    #[test]
    fn track_length_used_until_engine_reports_duration() {
        let session = PlaybackSession {
            catalog: Some(catalog().into_shared()),
            state: SessionState::Ready { index: 0, playing: false },
            ..Default::default()
        };
        let view = ListenerView::project(&session, ROTATION_PERIOD);
        assert_eq!(view.now_playing.unwrap().time, "0:00/3:35");
        assert!(!view.buffering);
        assert!(!view.rotation.active);
    }

    #[test]
    fn empty_catalog_shows_empty_list() {
        let session = PlaybackSession {
            catalog: Some(Catalog::default().into_shared()),
            state: SessionState::Empty,
            ..Default::default()
        };
        let view = ListenerView::project(&session, ROTATION_PERIOD);
        assert!(view.rows.is_empty());
        assert!(view.now_playing.is_none());
        assert_eq!(view.status, "empty");
    }
}
