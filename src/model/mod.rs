//! Model module - catalog and session state
//!
//! - `track`: track descriptors and the ordered catalog
//! - `session`: session lifecycle, progress samples and the published snapshot

mod track;
mod session;

pub use track::{Catalog, Track};
pub use session::{PlaybackSession, ProgressSample, SessionState};
