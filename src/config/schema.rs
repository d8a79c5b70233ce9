use serde::{Deserialize, Serialize};

use crate::session::RepeatMode;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadenza/config.toml` or `~/.config/cadenza/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CADENZA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub playback: PlaybackSettings,
    pub resolver: ResolverSettings,
    pub radio: RadioSettings,
    pub images: ImageSettings,
    pub account: AccountSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the catalog proxy (details, media links, favorites).
    pub base_url: String,
    /// Base URL of the station service (station creation and continuation).
    pub radio_base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787/api".to_string(),
            radio_base_url: "https://mserver-pi.vercel.app".to_string(),
            timeout_secs: 15,
            user_agent: concat!("cadenza/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Initial output volume, `0.0..=1.0`.
    pub volume: f32,
    /// Initial repeat mode.
    pub repeat: RepeatModeSetting,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 0.7,
            repeat: RepeatModeSetting::Off,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[serde(alias = "none", alias = "no-repeat", alias = "no_repeat")]
    Off,
    #[serde(alias = "repeat-all", alias = "repeat_all", alias = "loop-all")]
    All,
    #[serde(alias = "repeat-one", alias = "repeat_one", alias = "loop-one")]
    One,
}

impl From<RepeatModeSetting> for RepeatMode {
    fn from(value: RepeatModeSetting) -> Self {
        match value {
            RepeatModeSetting::Off => RepeatMode::Off,
            RepeatModeSetting::All => RepeatMode::All,
            RepeatModeSetting::One => RepeatMode::One,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Quality tiers in order of preference. When none of them is offered
    /// the last link of the list is used.
    pub quality_preference: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            quality_preference: crate::resolver::DEFAULT_QUALITY_PREFERENCE
                .iter()
                .map(|q| q.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RadioSettings {
    /// Fetch more station tracks once this many (or fewer) remain.
    pub refill_threshold: usize,
    /// Tracks requested per continuation call.
    pub batch_size: usize,
}

impl Default for RadioSettings {
    fn default() -> Self {
        Self {
            refill_threshold: crate::radio::DEFAULT_REFILL_THRESHOLD,
            batch_size: crate::radio::DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Artwork size substituted for the catalog's low-res size tokens.
    pub size: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            size: "500x500".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Signed-in user. Favorites and play history are disabled without it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "cadenza=info".to_string(),
        }
    }
}
