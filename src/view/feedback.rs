//! Rotation and buffering feedback
//!
//! Both are derived from session state only and never feed back into it.

use std::time::Duration;

use crate::config::{ROTATION_PERIOD, TOAST_DURATION};
use crate::model::{PlaybackSession, ProgressSample};

pub const BUFFERING_MESSAGE: &str = "Buffering...";

/// How the artwork should be spinning right now
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationDescriptor {
    pub active: bool,
    /// Time for one full revolution
    pub period: Duration,
}

impl RotationDescriptor {
    pub fn for_session(session: &PlaybackSession, period: Duration) -> Self {
        Self {
            active: session.rotation_active(),
            period,
        }
    }
}

/// True while playing and the buffered horizon is short of the track length.
/// Always false when paused, whatever the buffer says.
pub fn buffering_notice(is_playing: bool, progress: &ProgressSample) -> bool {
    is_playing && progress.is_still_buffering()
}

/// Artwork angle, owned and ticked by the UI layer.
///
/// Loops indefinitely while the descriptor is active; freezes in place as
/// soon as it is not.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationClock {
    degrees: f64,
}

impl RotationClock {
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn advance(&mut self, rotation: &RotationDescriptor, elapsed: Duration) -> f64 {
        if rotation.active && !rotation.period.is_zero() {
            let turn = elapsed.as_secs_f64() / rotation.period.as_secs_f64();
            self.degrees = (self.degrees + 360.0 * turn).rem_euclid(360.0);
        }
        self.degrees
    }
}

/// Short advisory message for the UI
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub duration: Duration,
}

/// Feedback derived from one session snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
    pub rotation: RotationDescriptor,
    pub buffering: bool,
    /// Set only on the snapshot where buffering starts
    pub toast: Option<Toast>,
}

/// Turns session snapshots into feedback, raising the buffering toast once
/// per buffering episode.
#[derive(Clone, Debug)]
pub struct FeedbackDriver {
    rotation_period: Duration,
    toast_duration: Duration,
    was_buffering: bool,
}

impl Default for FeedbackDriver {
    fn default() -> Self {
        Self::new(ROTATION_PERIOD, TOAST_DURATION)
    }
}

impl FeedbackDriver {
    pub fn new(rotation_period: Duration, toast_duration: Duration) -> Self {
        Self {
            rotation_period,
            toast_duration,
            was_buffering: false,
        }
    }

    pub fn observe(&mut self, session: &PlaybackSession) -> Feedback {
        let buffering = buffering_notice(session.is_playing(), &session.progress);
        let toast = (buffering && !self.was_buffering).then(|| {
            tracing::debug!(progress = ?session.progress, "Buffering notice raised");
            Toast {
                message: BUFFERING_MESSAGE.to_string(),
                duration: self.toast_duration,
            }
        });
        self.was_buffering = buffering;

        Feedback {
            rotation: RotationDescriptor::for_session(session, self.rotation_period),
            buffering,
            toast,
        }
    }
}
