//! Track catalog loading
//!
//! Fetches the "new songs" list and normalizes each entry into a [`Track`].
//! Loading never touches the playback engine.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ListenerConfig;
use crate::error::CatalogError;
use crate::model::{Catalog, Track};

/// Anything that can produce the session's track list
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Catalog, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct NewSongResponse {
    result: Vec<SongEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SongEntry {
    id: u64,
    name: String,
    #[serde(default)]
    pic_url: Option<String>,
    #[serde(default)]
    song: Option<SongDetail>,
}

#[derive(Debug, Deserialize)]
struct SongDetail {
    id: u64,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    #[serde(default)]
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

/// Map a raw response body to a catalog.
///
/// `song_url` builds the stream URL from the song id.
pub fn parse_catalog<F>(body: &str, song_url: F) -> Result<Catalog, CatalogError>
where
    F: Fn(u64) -> String,
{
    let response: NewSongResponse = serde_json::from_str(body)?;

    response
        .result
        .into_iter()
        .enumerate()
        .map(|(position, entry)| -> Result<Track, CatalogError> {
            let song = entry.song.ok_or_else(|| {
                CatalogError::MalformedData(format!("entry {position} ({}) has no song", entry.id))
            })?;
            let artist = song.artists.into_iter().next().ok_or_else(|| {
                CatalogError::MalformedData(format!("entry {position} ({}) has no artist", entry.id))
            })?;
            let duration_ms = song.duration.ok_or_else(|| {
                CatalogError::MalformedData(format!("entry {position} ({}) has no duration", entry.id))
            })?;

            Ok(Track {
                id: entry.id,
                url: song_url(song.id),
                title: entry.name,
                artist: artist.name,
                artwork: entry.pic_url.filter(|url| !url.is_empty()),
                duration: Duration::from_millis(duration_ms),
            })
        })
        .collect()
}

/// Catalog fetched over HTTP from the configured endpoint
#[derive(Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    config: ListenerConfig,
}

impl HttpCatalog {
    pub fn new(config: &ListenerConfig) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn load(&self) -> Result<Catalog, CatalogError> {
        let url = &self.config.catalog_url;
        tracing::debug!(url = %url, "Fetching catalog");

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;

        let catalog = parse_catalog(&body, |id| self.config.song_url(id))?;
        tracing::info!(tracks = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }
}

/// Fixed in-memory catalog
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    catalog: Catalog,
}

impl StaticCatalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            catalog: Catalog::new(tracks),
        }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load(&self) -> Result<Catalog, CatalogError> {
        Ok(self.catalog.clone())
    }
}
