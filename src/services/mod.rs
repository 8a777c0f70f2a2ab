// src/services/mod.rs
pub mod audio_store;
pub mod chat_relay;
pub mod session;
pub mod synthesizer;
