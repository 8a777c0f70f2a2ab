// src/services/synthesizer.rs
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use super::audio_store::AudioStore;
use crate::error::{Error, Result};

const GOOGLE_TTS_URL: &str = "https://translate.google.com/translate_tts";
/// Longest text the Google endpoint accepts in one request.
const MAX_CHUNK_CHARS: usize = 100;

/// Turns text into MP3 bytes.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>>;
}

/// Google Translate speech endpoint, the same one gTTS uses.
#[derive(Clone, Debug)]
pub struct GoogleTts {
    client: reqwest::Client,
    url: String,
}

impl GoogleTts {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_url(GOOGLE_TTS_URL, timeout)
    }

    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into() })
    }

    async fn fetch_chunk(&self, chunk: &str, lang: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", chunk),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("speech endpoint returned {status}: {body}")));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechEngine for GoogleTts {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(Error::Tts("no text to speak".to_string()));
        }

        // MP3 frames are self-delimiting, so the chunks play back-to-back.
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, lang, idx, chunks.len()).await?);
        }
        Ok(audio)
    }
}

/// Saves synthesized replies as audio files.
#[derive(Clone)]
pub struct Synthesizer {
    engine: Arc<dyn SpeechEngine>,
    store: AudioStore,
    lang: String,
}

impl Synthesizer {
    pub fn new(engine: Arc<dyn SpeechEngine>, store: AudioStore, lang: impl Into<String>) -> Self {
        Self { engine, store, lang: lang.into() }
    }

    pub fn store(&self) -> &AudioStore {
        &self.store
    }

    /// Synthesize `text` and return the bare filename of the saved audio.
    pub async fn synthesize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::Tts("no text to speak".to_string()));
        }
        let audio = self.engine.synthesize(text, &self.lang).await?;
        self.store.save(&audio).await
    }
}

/// Pack words into chunks of at most `max` chars. When a chunk overflows it
/// is cut after its last punctuation mark if it has one. Words longer than
/// `max` are hard-split.
pub fn split_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max {
            if !current.is_empty() {
                chunks.push(current.join(" "));
                current.clear();
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if !current.is_empty() && words_len(&current) + 1 + word_len > max {
            let cut = current
                .iter()
                .rposition(|w| w.ends_with(['.', '!', '?', ';', ':', ',']))
                .map_or(current.len(), |i| i + 1);
            let rest = current.split_off(cut);
            chunks.push(current.join(" "));
            current = rest;

            if !current.is_empty() && words_len(&current) + 1 + word_len > max {
                chunks.push(current.join(" "));
                current.clear();
            }
        }
        current.push(word);
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

fn words_len(words: &[&str]) -> usize {
    words.iter().map(|w| w.chars().count()).sum::<usize>() + words.len().saturating_sub(1)
}
