// src/services/audio_store.rs
use std::{
    path::{Component, Path, PathBuf},
    time::{Duration, SystemTime},
};

use uuid::Uuid;

use crate::error::Result;

const PREFIX: &str = "audio_";
const EXTENSION: &str = ".mp3";

/// Directory holding generated audio files.
#[derive(Clone, Debug)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Fresh `audio_<hex>.mp3` name.
    pub fn new_filename() -> String {
        format!("{PREFIX}{}{EXTENSION}", Uuid::new_v4().simple())
    }

    /// Write audio bytes under a new random name and return that name.
    pub async fn save(&self, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = Self::new_filename();
        tokio::fs::write(self.dir.join(&filename), bytes).await?;
        tracing::debug!(file = %filename, size = bytes.len(), "saved audio");
        Ok(filename)
    }

    /// Path for a client-supplied name, or `None` if it could escape the
    /// directory or is not a name `save` hands out.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty() || filename.starts_with('.') {
            return None;
        }
        if filename.contains(['/', '\\', '\0']) {
            return None;
        }
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if is_artifact_name(filename) => {
                Some(self.dir.join(filename))
            }
            _ => None,
        }
    }

    /// Remove generated audio older than `ttl`. Returns number removed.
    pub async fn purge_expired(&self, ttl: Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_artifact_name(name) {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let age = meta
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or_default();
            if age >= ttl {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Purge expired audio every `ttl / 2` (at least once a second) in the
    /// background.
    pub fn spawn_sweeper(self, ttl: Duration) -> tokio::task::JoinHandle<()> {
        let period = (ttl / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match self.purge_expired(ttl).await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!(removed = n, "purged expired audio"),
                    Err(e) => tracing::warn!(error = %e, "audio sweep failed"),
                }
            }
        })
    }
}

pub fn is_artifact_name(name: &str) -> bool {
    name.strip_prefix(PREFIX)
        .and_then(|rest| rest.strip_suffix(EXTENSION))
        .is_some_and(|hex| hex.len() == 32 && hex.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')))
}
