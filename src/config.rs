// src/config.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CHAT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_LANG: &str = "en";
pub const ASSISTANT_NAME: &str = "Quark";

/// Process-wide settings, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub port: u16,
    pub chat_url: String,
    pub model: String,
    pub tts_lang: String,
    pub tts_timeout: Duration,
    pub audio_dir: PathBuf,
    /// `None` keeps audio files forever.
    pub audio_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("Set OPENROUTER_API_KEY in environment before deploying".to_string())
            })?;

        let port: u16 = match lookup("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT: {p}")))?,
            None => DEFAULT_PORT,
        };

        let tts_timeout = parse_secs(&lookup, "TTS_TIMEOUT_SECS")?.unwrap_or(30);
        let audio_ttl = parse_secs(&lookup, "AUDIO_TTL_SECS")?.map(Duration::from_secs);

        Ok(Self {
            api_key,
            port,
            chat_url: lookup("OPENROUTER_URL").unwrap_or_else(|| DEFAULT_CHAT_URL.to_string()),
            model: lookup("CHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            tts_lang: lookup("TTS_LANG").unwrap_or_else(|| DEFAULT_LANG.to_string()),
            tts_timeout: Duration::from_secs(tts_timeout),
            audio_dir: lookup("AUDIO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            audio_ttl,
        })
    }
}

/// Positive whole seconds; zero is a config error.
fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| match v.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(Error::Config(format!("invalid {key}: {v}"))),
            Ok(secs) => Ok(secs),
        })
        .transpose()
}
