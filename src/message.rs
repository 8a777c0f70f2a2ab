// src/message.rs
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply_text: String,
    pub audio_file: String,
}
