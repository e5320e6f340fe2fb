//! Progress feed listener

use crate::engine::ProgressFeed;
use crate::error::Result;
use crate::model::{ProgressSample, SessionState};

use super::SessionCoordinator;

impl SessionCoordinator {
    /// Take the engine's push feed and start applying its samples.
    /// Does nothing if the feed was already taken.
    pub(crate) async fn attach_progress_feed(&self) {
        let mut listener = self.progress_listener.lock().await;
        if listener.is_some() {
            return;
        }

        match self.engine.take_progress_feed().await {
            Some(feed) => *listener = Some(self.start_progress_listener(feed)),
            None => tracing::warn!("Engine progress feed unavailable, relying on polling"),
        }
    }

    fn start_progress_listener(&self, mut feed: ProgressFeed) -> tokio::task::JoinHandle<()> {
        let coordinator = self.clone();
        tracing::info!("Starting progress listener");

        tokio::spawn(async move {
            while let Some(sample) = feed.recv().await {
                if !coordinator.apply_progress(sample).await {
                    tracing::debug!("Progress listener shutting down");
                    break;
                }
            }
        })
    }

    /// Replace the stored progress with `sample` and publish.
    ///
    /// Re-applying the same sample is a no-op for observers. Returns `false`
    /// once the session is closed.
    pub async fn apply_progress(&self, sample: ProgressSample) -> bool {
        let mut session = self.session.lock().await;
        if session.state == SessionState::Closed {
            return false;
        }

        if sample.buffered < sample.position {
            tracing::trace!(?sample, "Buffered horizon behind position");
        } else {
            tracing::trace!(?sample, "Progress sample");
        }

        if session.progress != sample {
            session.progress = sample;
            self.publish(&session);
        }
        true
    }

    /// Pull the current progress from the engine instead of waiting for the feed
    pub async fn poll_progress(&self) -> Result<ProgressSample> {
        let sample = self.engine.progress().await?;
        self.apply_progress(sample).await;
        Ok(sample)
    }
}
