//! Listener playback session
//!
//! Loads a song catalog, hands it to a playback engine and keeps the UI's
//! idea of "what is playing" in step with the engine.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod view;

pub use catalog::{CatalogSource, HttpCatalog, StaticCatalog};
pub use config::ListenerConfig;
pub use controller::{Command, CommandOutcome, SessionCoordinator};
pub use engine::{EngineAdapter, PlaybackEngine, SimulatedEngine};
pub use error::{CatalogError, EngineError, SessionError};
pub use model::{Catalog, PlaybackSession, ProgressSample, SessionState, Track};
