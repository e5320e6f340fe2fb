//! Runtime settings
//!
//! There is no configuration file. Every setting has a built-in default and a
//! few can be overridden through environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "http://cloud-music.pl-fe.cn/personalized/newsong?limit=200";
pub const DEFAULT_SONG_URL_TEMPLATE: &str = "https://music.163.com/song/media/outer/url?id={id}.mp3";
pub const DEFAULT_LOG_DIR: &str = ".logs";

/// One full artwork revolution
pub const ROTATION_PERIOD: Duration = Duration::from_secs(15);
/// How long the buffering toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(3);
/// Interval between progress samples emitted by the simulated engine
pub const PROGRESS_TICK: Duration = Duration::from_millis(250);

const ENV_CATALOG_URL: &str = "LISTENER_CATALOG_URL";
const ENV_SONG_URL_TEMPLATE: &str = "LISTENER_SONG_URL_TEMPLATE";
const ENV_HTTP_TIMEOUT_SECS: &str = "LISTENER_HTTP_TIMEOUT_SECS";
const ENV_LOG_DIR: &str = "LISTENER_LOG_DIR";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerConfig {
    pub catalog_url: String,
    /// Stream URL template, `{id}` is replaced by the song id
    pub song_url_template: String,
    /// `None` means catalog requests never time out
    pub http_timeout: Option<Duration>,
    pub rotation_period: Duration,
    pub toast_duration: Duration,
    pub progress_tick: Duration,
    pub log_dir: PathBuf,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            song_url_template: DEFAULT_SONG_URL_TEMPLATE.to_string(),
            http_timeout: None,
            rotation_period: ROTATION_PERIOD,
            toast_duration: TOAST_DURATION,
            progress_tick: PROGRESS_TICK,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl ListenerConfig {
    /// Defaults with overrides read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_CATALOG_URL).filter(|v| !v.trim().is_empty()) {
            config.catalog_url = url.trim().to_string();
        }

        if let Some(template) = lookup(ENV_SONG_URL_TEMPLATE) {
            if template.contains("{id}") {
                config.song_url_template = template;
            } else {
                tracing::warn!(value = %template, "Song URL template has no {{id}} placeholder, keeping default");
            }
        }

        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.http_timeout = None,
                Ok(secs) => config.http_timeout = Some(Duration::from_secs(secs)),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Invalid HTTP timeout, keeping default");
                }
            }
        }

        config.log_dir = log_dir_from(&lookup);
        config
    }

    /// Log directory alone, so logging can start before the rest of the
    /// settings are read and their warnings still reach the log file.
    pub fn log_dir_from_env() -> PathBuf {
        log_dir_from(|key| std::env::var(key).ok())
    }

    pub fn song_url(&self, song_id: u64) -> String {
        self.song_url_template.replace("{id}", &song_id.to_string())
    }
}

fn log_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_LOG_DIR)
        .map(|dir| dir.trim().to_string())
        .filter(|dir| !dir.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from)
}
