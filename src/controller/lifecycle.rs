//! Session bootstrap and teardown

use crate::catalog::CatalogSource;
use crate::error::{Result, SessionError};
use crate::model::{Catalog, SessionState};

use super::SessionCoordinator;

impl SessionCoordinator {
    /// Load the catalog from `source` and bring the session to `Ready`.
    ///
    /// A catalog failure leaves the session `Uninitialized` with the error
    /// recorded, so the caller may retry.
    pub async fn bootstrap(&self, source: &dyn CatalogSource) -> Result<()> {
        self.ensure_uninitialized().await?;

        tracing::info!("Loading catalog");
        let catalog = match source.load().await {
            Ok(catalog) => catalog,
            Err(e) => return Err(self.record_failure("load_catalog", e.into()).await),
        };

        self.catalog_loaded(catalog).await
    }

    /// `Uninitialized --catalogLoaded--> Loading --engineReady--> Ready(paused)`.
    ///
    /// An empty catalog goes to the terminal `Empty` state instead and the
    /// engine is left untouched.
    pub async fn catalog_loaded(&self, catalog: Catalog) -> Result<()> {
        let _transport = self.transport.lock().await;
        self.ensure_uninitialized().await?;

        let catalog = catalog.into_shared();
        {
            let mut session = self.session.lock().await;
            session.catalog = Some(catalog.clone());
            session.last_error = None;
            session.state = if catalog.is_empty() {
                SessionState::Empty
            } else {
                SessionState::Loading
            };
            tracing::debug!(state = session.state.name(), tracks = catalog.len(), "Catalog accepted");
            self.publish(&session);
        }

        if catalog.is_empty() {
            tracing::warn!("Catalog is empty, nothing to play");
            return Ok(());
        }

        if let Err(e) = self.engine.initialize(catalog.tracks()).await {
            tracing::error!(error = %e, "Engine initialization failed");
            let mut session = self.session.lock().await;
            session.catalog = None;
            session.state = SessionState::Uninitialized;
            session.last_error = Some(Self::format_error(&e));
            self.publish(&session);
            return Err(e);
        }

        self.attach_progress_feed().await;
        self.commit(SessionState::Ready { index: 0, playing: false }).await;
        tracing::info!(tracks = catalog.len(), "Session ready");
        Ok(())
    }

    /// Stop the engine and close the session. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        let _transport = self.transport.lock().await;
        if self.state().await == SessionState::Closed {
            return Ok(());
        }

        let stopped = self.engine.stop().await;

        if let Some(listener) = self.progress_listener.lock().await.take() {
            listener.abort();
        }

        self.commit(SessionState::Closed).await;
        tracing::info!("Session closed");

        if let Err(e) = stopped {
            return Err(self.record_failure("shutdown", e).await);
        }
        Ok(())
    }

    async fn ensure_uninitialized(&self) -> Result<()> {
        match self.state().await {
            SessionState::Uninitialized => Ok(()),
            SessionState::Closed => Err(SessionError::Closed),
            _ => Err(SessionError::AlreadyInitialized),
        }
    }
}
