// src/state.rs
use std::sync::Arc;

use crate::config::{ASSISTANT_NAME, Config};
use crate::error::Result;
use crate::services::audio_store::AudioStore;
use crate::services::chat_relay::ChatRelay;
use crate::services::session::Session;
use crate::services::synthesizer::{GoogleTts, Synthesizer};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub session: Session,
    pub relay: ChatRelay,
    pub synthesizer: Synthesizer,
}

impl AppState {
    pub fn new(relay: ChatRelay, synthesizer: Synthesizer) -> Self {
        Self {
            session: Session::for_assistant(ASSISTANT_NAME),
            relay,
            synthesizer,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let relay = ChatRelay::from_config(config)?;
        let engine = Arc::new(GoogleTts::new(config.tts_timeout)?);
        let synthesizer = Synthesizer::new(engine, AudioStore::new(&config.audio_dir), &config.tts_lang);
        Ok(Self::new(relay, synthesizer))
    }

    pub fn audio(&self) -> &AudioStore {
        self.synthesizer.store()
    }
}
