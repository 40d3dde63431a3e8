//! Process configuration.
//!
//! Built once at startup from the environment and handed to the clients and
//! the extras cache by reference. Nothing below the server's `main` reads the
//! environment directly.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("required setting {0} is missing")]
    Missing(&'static str),
    #[error("setting {key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// A credential that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: Secret,
    pub base_url: String,
    pub image_base: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// `None` puts the video client in search-link fallback mode.
    pub api_key: Option<Secret>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<Secret>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: String,
    /// ISO 3166-1 code used for watch providers, discover and video search.
    pub region: String,
    /// `None` disables the home-feed warmup task.
    pub warmup_interval: Option<Duration>,
    pub log_format: LogFormat,
    pub tmdb: TmdbConfig,
    pub youtube: YouTubeConfig,
    pub gemini: GeminiConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let tmdb_key = get("TMDB_API_KEY").ok_or(ConfigError::Missing("TMDB_API_KEY"))?;

        let warmup_interval = match get("MARQUEE_WARMUP_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    key: "MARQUEE_WARMUP_SECS",
                    value: raw.clone(),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => Some(Duration::from_secs(24 * 60 * 60)),
        };

        let log_format = match get("MARQUEE_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "MARQUEE_LOG_FORMAT",
                    value: other.to_string(),
                });
            }
        };

        let region = get("MARQUEE_REGION")
            .unwrap_or_else(|| "IN".to_string())
            .to_ascii_uppercase();

        Ok(Self {
            bind_addr: get("MARQUEE_BIND").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_path: get("MARQUEE_DB").unwrap_or_else(|| "marquee.db".to_string()),
            region,
            warmup_interval,
            log_format,
            tmdb: TmdbConfig {
                api_key: Secret::new(tmdb_key),
                base_url: get("TMDB_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string()),
                image_base: DEFAULT_TMDB_IMAGE_BASE.to_string(),
                language: get("MARQUEE_LANGUAGE").unwrap_or_else(|| "en-US".to_string()),
            },
            youtube: YouTubeConfig {
                api_key: get("YOUTUBE_API_KEY").map(Secret::new),
                base_url: get("YOUTUBE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_YOUTUBE_BASE_URL.to_string()),
            },
            gemini: GeminiConfig {
                api_key: get("GEMINI_API_KEY").map(Secret::new),
                base_url: get("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
        })
    }
}
