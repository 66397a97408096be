//! Process configuration read from the environment

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::llm::{gemini::DEFAULT_BASE_URL, GeminiModel, GenerationConfig};

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_DOWNLOADS_DIR: &str = "downloads";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for one server process
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Sent as `x-goog-api-key`; empty means unset
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub generation: GenerationConfig,
    pub bind_addr: SocketAddr,
    pub downloads_dir: PathBuf,
    pub max_upload_bytes: u64,
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut generation = GenerationConfig::new();
        if let Some(max_tokens) = parse(&get, "GEMINI_MAX_OUTPUT_TOKENS")? {
            generation = generation.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = parse(&get, "GEMINI_TEMPERATURE")? {
            generation = generation.with_temperature(temperature);
        }

        Ok(Self {
            gemini_api_key: get("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            generation,
            bind_addr: parse(&get, "DOCCHAT_BIND")?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 5000))),
            downloads_dir: get("DOCCHAT_DOWNLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOADS_DIR)),
            max_upload_bytes: parse(&get, "DOCCHAT_MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.gemini_api_key.is_empty()
    }

    /// Model selected by `GEMINI_MODEL`
    pub fn model(&self) -> GeminiModel {
        GeminiModel::from(self.gemini_model.as_str())
    }
}

fn parse<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue {
                    key,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}
