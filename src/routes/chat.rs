use axum::{Json, extract::State};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::session::MessageRole,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let user_msg = match payload.message {
        Some(m) if !m.is_empty() => m,
        _ => return Err(AppError::BadRequest("No message".to_string())),
    };

    let reply_text = {
        let _turn = state.session.begin_turn().await;
        state.session.append(MessageRole::User, user_msg).await;
        let history = state.session.history().await;
        let reply = state.relay.complete(&history).await;
        state.session.append(MessageRole::Assistant, reply.as_str()).await;
        reply
    };

    let audio_file = state.synthesizer.synthesize(&reply_text).await?;
    tracing::info!(audio = %audio_file, chars = reply_text.len(), "chat reply ready");

    Ok(Json(ChatResponse { reply_text, audio_file }))
}
