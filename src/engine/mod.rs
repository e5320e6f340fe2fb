//! Playback engine boundary
//!
//! - `PlaybackEngine`: the raw capability an audio engine provides
//! - `adapter`: contract checks (initialize once, index bounds) on top of it
//! - `simulated`: in-memory engine with a virtual clock

mod adapter;
mod simulated;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::EngineError;
use crate::model::{ProgressSample, Track};

pub use adapter::EngineAdapter;
pub use simulated::{EngineCall, SimulatedEngine};

/// Continuous progress feed pushed by the engine
pub type ProgressFeed = mpsc::UnboundedReceiver<ProgressSample>;

/// Audio engine operations. Every call may suspend and fails independently.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    async fn setup(&self) -> Result<(), EngineError>;

    /// Append tracks to the engine queue
    async fn add(&self, tracks: &[Track]) -> Result<(), EngineError>;

    async fn play(&self) -> Result<(), EngineError>;

    async fn pause(&self) -> Result<(), EngineError>;

    /// Jump to a queue position
    async fn skip(&self, index: usize) -> Result<(), EngineError>;

    async fn skip_to_next(&self) -> Result<(), EngineError>;

    async fn skip_to_previous(&self) -> Result<(), EngineError>;

    /// Stop playback and release resources
    async fn stop(&self) -> Result<(), EngineError>;

    /// Latest (position, buffered, duration) reading
    async fn progress(&self) -> ProgressSample;

    /// Hand out the push feed. Returns `None` once taken.
    async fn take_progress_feed(&self) -> Option<ProgressFeed>;
}
