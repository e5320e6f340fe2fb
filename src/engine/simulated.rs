//! In-memory playback engine
//!
//! Keeps a queue and a virtual clock. While playing, each tick advances the
//! position by the tick length and the buffered horizon by
//! `DOWNLOAD_SPEEDUP` times that, both capped at the track length. The clock
//! holds at the end of a track; it does not auto-advance the queue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::{PlaybackEngine, ProgressFeed};
use crate::error::EngineError;
use crate::model::{ProgressSample, Track};

const DOWNLOAD_SPEEDUP: u32 = 4;

/// A call received by the engine, in arrival order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCall {
    Setup,
    Add(usize),
    Play,
    Pause,
    Skip(usize),
    SkipToNext,
    SkipToPrevious,
    Stop,
}

#[derive(Default)]
struct EngineState {
    set_up: bool,
    queue: Vec<Track>,
    current: usize,
    playing: bool,
    position: Duration,
    buffered: Duration,
    calls: Vec<EngineCall>,
    fail_next: Option<String>,
    /// One-shot failures armed for a specific call
    fail_on: Vec<(EngineCall, String)>,
    latency: Duration,
    in_flight: usize,
    max_in_flight: usize,
}

impl EngineState {
    fn sample(&self) -> ProgressSample {
        let duration = self
            .queue
            .get(self.current)
            .map(|t| t.duration)
            .unwrap_or_default();
        ProgressSample::new(self.position, self.buffered, duration)
    }

    fn jump_to(&mut self, index: usize) {
        self.current = index;
        self.position = Duration::ZERO;
        self.buffered = Duration::ZERO;
    }
}

pub struct SimulatedEngine {
    state: Arc<Mutex<EngineState>>,
    feed_tx: mpsc::UnboundedSender<ProgressSample>,
    feed_rx: Mutex<Option<ProgressFeed>>,
    tick: Option<Duration>,
    clock: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedEngine {
    /// Engine without a running clock; progress only moves through
    /// [`SimulatedEngine::emit_progress`].
    pub fn new() -> Self {
        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(Mutex::new(EngineState::default())),
            feed_tx,
            feed_rx: Mutex::new(Some(feed_rx)),
            tick: None,
            clock: Mutex::new(None),
        }
    }

    /// Engine whose clock starts ticking on `setup`
    pub fn with_clock(tick: Duration) -> Self {
        Self {
            tick: Some(tick),
            ..Self::new()
        }
    }

    /// Make the next call fail with `message` without changing engine state
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.state.lock().await.fail_next = Some(message.into());
    }

    /// Make the next occurrence of `call` fail, letting other calls through
    pub async fn fail_on(&self, call: EngineCall, message: impl Into<String>) {
        self.state.lock().await.fail_on.push((call, message.into()));
    }

    /// Delay applied to every transport call before it completes
    pub async fn set_latency(&self, latency: Duration) {
        self.state.lock().await.latency = latency;
    }

    pub async fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().await.calls.clone()
    }

    /// Highest number of transport calls ever pending at the same time
    pub async fn max_in_flight(&self) -> usize {
        self.state.lock().await.max_in_flight
    }

    pub async fn current_index(&self) -> usize {
        self.state.lock().await.current
    }

    pub async fn is_playing(&self) -> bool {
        self.state.lock().await.playing
    }

    /// Push a sample on the feed as if the engine had reported it
    pub fn emit_progress(&self, sample: ProgressSample) {
        if self.feed_tx.send(sample).is_err() {
            tracing::trace!("Progress feed closed, sample dropped");
        }
    }

    async fn transport<F>(&self, call: EngineCall, apply: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut EngineState) -> Result<(), String>,
    {
        let latency = {
            let mut state = self.state.lock().await;
            state.calls.push(call.clone());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock().await;
        state.in_flight -= 1;

        if let Some(message) = state.fail_next.take() {
            return Err(EngineError::new(call_name(&call), message));
        }
        if let Some(armed) = state.fail_on.iter().position(|(c, _)| *c == call) {
            let (_, message) = state.fail_on.remove(armed);
            return Err(EngineError::new(call_name(&call), message));
        }
        if !state.set_up && !matches!(call, EngineCall::Setup | EngineCall::Stop) {
            return Err(EngineError::new(call_name(&call), "player is not set up"));
        }

        apply(&mut *state).map_err(|message| EngineError::new(call_name(&call), message))?;
        let sample = state.sample();
        drop(state);

        self.emit_progress(sample);
        Ok(())
    }

    fn start_clock(&self, tick: Duration) -> JoinHandle<()> {
        let state = self.state.clone();
        let feed_tx = self.feed_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                let sample = {
                    let mut state = state.lock().await;
                    if !state.playing {
                        continue;
                    }
                    let length = state.sample().duration;
                    state.position = (state.position + tick).min(length);
                    state.buffered = (state.buffered + tick * DOWNLOAD_SPEEDUP).min(length);
                    state.sample()
                };
                if feed_tx.send(sample).is_err() {
                    break;
                }
            }
        })
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn call_name(call: &EngineCall) -> &'static str {
    match call {
        EngineCall::Setup => "setup",
        EngineCall::Add(_) => "add",
        EngineCall::Play => "play",
        EngineCall::Pause => "pause",
        EngineCall::Skip(_) => "skip",
        EngineCall::SkipToNext => "skip_to_next",
        EngineCall::SkipToPrevious => "skip_to_previous",
        EngineCall::Stop => "stop",
    }
}

#[async_trait]
impl PlaybackEngine for SimulatedEngine {
    async fn setup(&self) -> Result<(), EngineError> {
        self.transport(EngineCall::Setup, |state| {
            state.set_up = true;
            Ok(())
        })
        .await?;

        if let Some(tick) = self.tick {
            let mut clock = self.clock.lock().await;
            if clock.is_none() {
                *clock = Some(self.start_clock(tick));
            }
        }
        Ok(())
    }

    async fn add(&self, tracks: &[Track]) -> Result<(), EngineError> {
        let tracks = tracks.to_vec();
        self.transport(EngineCall::Add(tracks.len()), move |state| {
            state.queue.extend(tracks);
            Ok(())
        })
        .await
    }

    async fn play(&self) -> Result<(), EngineError> {
        self.transport(EngineCall::Play, |state| {
            if state.queue.is_empty() {
                return Err("queue is empty".to_string());
            }
            state.playing = true;
            Ok(())
        })
        .await
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.transport(EngineCall::Pause, |state| {
            state.playing = false;
            Ok(())
        })
        .await
    }

    async fn skip(&self, index: usize) -> Result<(), EngineError> {
        self.transport(EngineCall::Skip(index), |state| {
            if index >= state.queue.len() {
                return Err(format!("no track at index {index}"));
            }
            state.jump_to(index);
            Ok(())
        })
        .await
    }

    async fn skip_to_next(&self) -> Result<(), EngineError> {
        self.transport(EngineCall::SkipToNext, |state| {
            let next = state.current + 1;
            if next >= state.queue.len() {
                return Err("no next track".to_string());
            }
            state.jump_to(next);
            Ok(())
        })
        .await
    }

    async fn skip_to_previous(&self) -> Result<(), EngineError> {
        self.transport(EngineCall::SkipToPrevious, |state| {
            let previous = state.current.checked_sub(1).ok_or("no previous track")?;
            state.jump_to(previous);
            Ok(())
        })
        .await
    }

    async fn stop(&self) -> Result<(), EngineError> {
        if let Some(clock) = self.clock.lock().await.take() {
            clock.abort();
        }
        self.transport(EngineCall::Stop, |state| {
            state.playing = false;
            state.queue.clear();
            state.jump_to(0);
            Ok(())
        })
        .await
    }

    async fn progress(&self) -> ProgressSample {
        self.state.lock().await.sample()
    }

    async fn take_progress_feed(&self) -> Option<ProgressFeed> {
        self.feed_rx.lock().await.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(n: u64) -> Vec<Track> {
        (0..n)
            .map(|id| Track {
                id,
                url: format!("http://songs/{id}.mp3"),
                title: format!("Song {id}"),
                artist: "Artist".to_string(),
                artwork: None,
                duration: Duration::from_secs(60),
            })
            .collect()
    }

    async fn ready_engine(n: u64) -> SimulatedEngine {
        let engine = SimulatedEngine::new();
        engine.setup().await.unwrap();
        engine.add(&tracks(n)).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn transport_requires_setup() {
        let engine = SimulatedEngine::new();
        let err = engine.play().await.unwrap_err();
        assert_eq!(err.operation, "play");
    }

    #[tokio::test]
    async fn skips_move_within_queue_bounds() {
        let engine = ready_engine(3).await;
        engine.skip_to_next().await.unwrap();
        engine.skip_to_next().await.unwrap();
        assert_eq!(engine.current_index().await, 2);
        assert!(engine.skip_to_next().await.is_err());

        engine.skip(0).await.unwrap();
        assert!(engine.skip_to_previous().await.is_err());
        assert!(engine.skip(3).await.is_err());
        assert_eq!(engine.current_index().await, 0);
    }

    #[tokio::test]
    async fn injected_failure_leaves_state_alone() {
        let engine = ready_engine(2).await;
        engine.fail_next("boom").await;
        let err = engine.skip(1).await.unwrap_err();
        assert_eq!(err.message, "boom");
        assert_eq!(engine.current_index().await, 0);

        engine.skip(1).await.unwrap();
        assert_eq!(engine.current_index().await, 1);
    }

    #[tokio::test]
    async fn targeted_failure_skips_other_calls() {
        let engine = ready_engine(3).await;
        engine.fail_on(EngineCall::Play, "decoder crashed").await;

        engine.skip(2).await.unwrap();
        let err = engine.play().await.unwrap_err();
        assert_eq!(err.operation, "play");
        assert_eq!(engine.current_index().await, 2);
        assert!(!engine.is_playing().await);

        engine.play().await.unwrap();
        assert!(engine.is_playing().await);
    }

    #[tokio::test]
    async fn feed_is_taken_once() {
        let engine = SimulatedEngine::new();
        assert!(engine.take_progress_feed().await.is_some());
        assert!(engine.take_progress_feed().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clock_advances_only_while_playing() {
        let engine = SimulatedEngine::with_clock(Duration::from_millis(500));
        let mut feed = engine.take_progress_feed().await.unwrap();
        engine.setup().await.unwrap();
        engine.add(&tracks(1)).await.unwrap();
        engine.play().await.unwrap();

        tokio::time::sleep(Duration::from_millis(1600)).await;
        let progress = engine.progress().await;
        assert!(progress.position >= Duration::from_millis(1500));
        assert!(progress.buffered >= progress.position);

        engine.pause().await.unwrap();
        let frozen = engine.progress().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(engine.progress().await, frozen);

        while let Ok(sample) = feed.try_recv() {
            assert!(sample.position <= sample.duration);
        }
    }
}
