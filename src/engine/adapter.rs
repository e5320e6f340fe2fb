//! Engine adapter enforcing the transport contract

use std::sync::Arc;

use tokio::sync::Mutex;

use super::{PlaybackEngine, ProgressFeed};
use crate::error::{Result, SessionError};
use crate::log_engine_result;
use crate::model::{ProgressSample, Track};

/// Wraps a [`PlaybackEngine`] so transport calls fail with typed errors
/// before initialization or with an out-of-range index.
pub struct EngineAdapter {
    engine: Arc<dyn PlaybackEngine>,
    queue_len: Mutex<Option<usize>>,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn PlaybackEngine>) -> Self {
        Self {
            engine,
            queue_len: Mutex::new(None),
        }
    }

    /// Set the engine up and queue every track. Allowed once; a failed
    /// attempt leaves the adapter uninitialized.
    pub async fn initialize(&self, tracks: &[Track]) -> Result<()> {
        let mut queue_len = self.queue_len.lock().await;
        if queue_len.is_some() {
            return Err(SessionError::AlreadyInitialized);
        }

        let result = self.engine.setup().await;
        log_engine_result!("setup", result);
        result?;

        let result = self.engine.add(tracks).await;
        log_engine_result!("add", result);
        result?;

        *queue_len = Some(tracks.len());
        tracing::info!(tracks = tracks.len(), "Engine queue initialized");
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.queue_len.lock().await.is_some()
    }

    pub async fn queue_len(&self) -> Result<usize> {
        self.queue_len.lock().await.ok_or(SessionError::NotInitialized)
    }

    pub async fn play(&self) -> Result<()> {
        self.queue_len().await?;
        let result = self.engine.play().await;
        log_engine_result!("play", result);
        Ok(result?)
    }

    pub async fn pause(&self) -> Result<()> {
        self.queue_len().await?;
        let result = self.engine.pause().await;
        log_engine_result!("pause", result);
        Ok(result?)
    }

    pub async fn skip_to_index(&self, index: usize) -> Result<()> {
        let len = self.queue_len().await?;
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        let result = self.engine.skip(index).await;
        log_engine_result!("skip", result);
        Ok(result?)
    }

    pub async fn skip_to_next(&self) -> Result<()> {
        self.queue_len().await?;
        let result = self.engine.skip_to_next().await;
        log_engine_result!("skip_to_next", result);
        Ok(result?)
    }

    pub async fn skip_to_previous(&self) -> Result<()> {
        self.queue_len().await?;
        let result = self.engine.skip_to_previous().await;
        log_engine_result!("skip_to_previous", result);
        Ok(result?)
    }

    pub async fn progress(&self) -> Result<ProgressSample> {
        self.queue_len().await?;
        Ok(self.engine.progress().await)
    }

    pub async fn take_progress_feed(&self) -> Option<ProgressFeed> {
        self.engine.take_progress_feed().await
    }

    /// Stop the engine. A no-op when it was never initialized.
    pub async fn stop(&self) -> Result<()> {
        if !self.is_initialized().await {
            return Ok(());
        }
        let result = self.engine.stop().await;
        log_engine_result!("stop", result);
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineCall, SimulatedEngine};
    use std::time::Duration;

    fn tracks(n: u64) -> Vec<Track> {
        (0..n)
            .map(|id| Track {
                id,
                url: format!("http://songs/{id}.mp3"),
                title: format!("Song {id}"),
                artist: "Artist".to_string(),
                artwork: None,
                duration: Duration::from_secs(120),
            })
            .collect()
    }

    #[tokio::test]
    async fn transport_before_initialize_fails() {
        let adapter = EngineAdapter::new(Arc::new(SimulatedEngine::new()));
        assert!(matches!(adapter.play().await, Err(SessionError::NotInitialized)));
        assert!(matches!(adapter.pause().await, Err(SessionError::NotInitialized)));
        assert!(matches!(adapter.skip_to_index(0).await, Err(SessionError::NotInitialized)));
        assert!(matches!(adapter.skip_to_next().await, Err(SessionError::NotInitialized)));
        assert!(matches!(adapter.skip_to_previous().await, Err(SessionError::NotInitialized)));
        assert!(matches!(adapter.progress().await, Err(SessionError::NotInitialized)));
    }

    #[tokio::test]
    async fn initialize_runs_setup_then_add_once() {
        let engine = Arc::new(SimulatedEngine::new());
        let adapter = EngineAdapter::new(engine.clone());

        adapter.initialize(&tracks(3)).await.unwrap();
        assert_eq!(adapter.queue_len().await.unwrap(), 3);
        assert_eq!(engine.calls().await, vec![EngineCall::Setup, EngineCall::Add(3)]);

        let second = adapter.initialize(&tracks(3)).await;
        assert!(matches!(second, Err(SessionError::AlreadyInitialized)));
    }

    #[tokio::test]
    async fn failed_initialize_can_be_retried() {
        let engine = Arc::new(SimulatedEngine::new());
        let adapter = EngineAdapter::new(engine.clone());

        engine.fail_next("no audio device").await;
        let first = adapter.initialize(&tracks(2)).await;
        assert!(matches!(first, Err(SessionError::EngineTransport(_))));
        assert!(!adapter.is_initialized().await);

        adapter.initialize(&tracks(2)).await.unwrap();
        assert!(adapter.is_initialized().await);
    }

    #[tokio::test]
    async fn skip_out_of_range_is_rejected_without_engine_call() {
        let engine = Arc::new(SimulatedEngine::new());
        let adapter = EngineAdapter::new(engine.clone());
        adapter.initialize(&tracks(2)).await.unwrap();

        let err = adapter.skip_to_index(2).await.unwrap_err();
        assert!(matches!(err, SessionError::IndexOutOfRange { index: 2, len: 2 }));
        assert!(!engine.calls().await.contains(&EngineCall::Skip(2)));
    }

    #[tokio::test]
    async fn stop_without_initialize_is_noop() {
        let engine = Arc::new(SimulatedEngine::new());
        let adapter = EngineAdapter::new(engine.clone());
        adapter.stop().await.unwrap();
        assert!(engine.calls().await.is_empty());
    }
}
