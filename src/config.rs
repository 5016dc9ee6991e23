//! Application-level configuration loading: event buffers, catalog source, AI and reveal pacing.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WATCHMA_BACK_CONFIG_PATH";
/// Environment variable holding the Jellyfin API key.
pub const JELLYFIN_API_KEY_ENV: &str = "JELLYFIN_API_KEY";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Event fabric sizing.
    pub events: EventsConfig,
    /// Catalog source and caching.
    pub catalog: CatalogConfig,
    /// Reveal dialogue generation.
    pub ai: AiConfig,
    /// Reveal timings.
    pub reveal: RevealPacing,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Sizing of the in-process event fabric.
pub struct EventsConfig {
    /// Per-subject buffer; subscribers further behind than this lose the oldest events.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

/// Origin of the movie catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    /// Built-in static catalog, useful for local play and tests.
    #[default]
    Dummy,
    /// Remote Jellyfin media server.
    Jellyfin,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Movie catalog settings.
pub struct CatalogConfig {
    /// Where movies come from.
    pub source: CatalogSource,
    /// How long a fetched catalog is reused.
    pub cache_ttl_secs: u64,
    /// Jellyfin server root, required for the Jellyfin source.
    pub jellyfin_base_url: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSource::Dummy,
            cache_ttl_secs: 300,
            jellyfin_base_url: None,
        }
    }
}

impl CatalogConfig {
    /// Catalog cache lifetime.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Dialogue generator settings.
pub struct AiConfig {
    /// Generate dialogue when an API key is available.
    pub enabled: bool,
    /// Chat completion model name.
    pub model: String,
    /// Upper bound on a single dialogue request; expiry degrades to an empty reveal.
    pub timeout_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o-mini".into(),
            timeout_ms: 15_000,
        }
    }
}

impl AiConfig {
    /// Dialogue request deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Timings of the scripted winner reveal.
pub struct RevealPacing {
    /// Pause after the opening drum roll.
    pub drum_roll_ms: u64,
    /// Pause after each generated dialogue line.
    pub line_ms: u64,
    /// Pause between the last dialogue line and the winner announcement.
    pub suspense_ms: u64,
    /// Pause on the winner announcement before results are shown.
    pub winner_ms: u64,
}

impl Default for RevealPacing {
    fn default() -> Self {
        Self {
            drum_roll_ms: 2_000,
            line_ms: 2_000,
            suspense_ms: 4_000,
            winner_ms: 5_000,
        }
    }
}

impl RevealPacing {
    /// Pacing with every pause removed.
    pub const fn instant() -> Self {
        Self {
            drum_roll_ms: 0,
            line_ms: 0,
            suspense_ms: 0,
            winner_ms: 0,
        }
    }

    /// Drum roll pause.
    pub fn drum_roll(&self) -> Duration {
        Duration::from_millis(self.drum_roll_ms)
    }

    /// Pause per dialogue line.
    pub fn line(&self) -> Duration {
        Duration::from_millis(self.line_ms)
    }

    /// Pause before the winner line.
    pub fn suspense(&self) -> Duration {
        Duration::from_millis(self.suspense_ms)
    }

    /// Pause on the winner line.
    pub fn winner(&self) -> Duration {
        Duration::from_millis(self.winner_ms)
    }
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        catalog = ?app_config.catalog.source,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent sections keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Read a secret from the environment, treating blank values as absent.
pub fn secret_from_env(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
